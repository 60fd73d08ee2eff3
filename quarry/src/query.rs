/// Static description of a generated query function.
///
/// One `QueryInfo` constant is emitted next to every query function,
/// so callers can register the query with an [`InvalidationTracker`](crate::InvalidationTracker).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueryInfo {
    pub name: &'static str,
    pub sql: &'static str,

    /// Tables read by relation fetches, beyond those named in `sql`.
    pub relation_tables: &'static [&'static str],

    /// Whether the primary cursor is snapshotted before conversion.
    pub copies_cursor: bool,
}

/// Result type of a query that only counts its rows.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowCount(pub usize);

impl From<RowCount> for usize {
    fn from(count: RowCount) -> Self {
        count.0
    }
}
