//!
//! Table invalidation tracking.
//!
//! Writers report modified tables with [`InvalidationTracker::notify`].
//! Readers hold an [`Observation`] over every table a query depends on,
//! including the tables its relation fields read from, and re-run the
//! query once the observation turns stale.
//!

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::query::QueryInfo;

#[derive(Clone, Default)]
pub struct InvalidationTracker {
    versions: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a modification of `table`.
    pub fn notify(&self, table: &str) {
        let mut versions = self.versions.lock();
        let version = versions.entry(table.to_owned()).or_insert(0);
        *version += 1;

        tracing::trace!(table, version = *version, "table invalidated");
    }

    /// Observe the given tables from now on.
    pub fn observe<'t, I>(&self, tables: I) -> Observation
    where
        I: IntoIterator<Item = &'t str>,
    {
        let tables: BTreeSet<String> = tables.into_iter().map(str::to_owned).collect();
        let seen = self.snapshot(&tables);

        Observation {
            tracker: self.clone(),
            tables,
            seen,
        }
    }

    /// Observe a generated query: its `primary_tables` (those named in its SQL)
    /// and the tables its relation fields read from.
    pub fn observe_query(&self, query: &QueryInfo, primary_tables: &[&str]) -> Observation {
        self.observe(
            primary_tables
                .iter()
                .chain(query.relation_tables.iter())
                .copied(),
        )
    }

    fn snapshot(&self, tables: &BTreeSet<String>) -> Vec<u64> {
        let versions = self.versions.lock();
        tables
            .iter()
            .map(|table| versions.get(table).copied().unwrap_or(0))
            .collect()
    }
}

/// A set of observed tables, and the versions they had when last refreshed.
pub struct Observation {
    tracker: InvalidationTracker,
    tables: BTreeSet<String>,
    seen: Vec<u64>,
}

impl Observation {
    pub fn tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    /// Whether any observed table was modified since the last refresh.
    pub fn is_stale(&self) -> bool {
        self.tracker.snapshot(&self.tables) != self.seen
    }

    pub fn refresh(&mut self) {
        self.seen = self.tracker.snapshot(&self.tables);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHORS_WITH_BOOKS: QueryInfo = QueryInfo {
        name: "authors_with_books",
        sql: "SELECT * FROM author",
        relation_tables: &["book"],
        copies_cursor: true,
    };

    #[test]
    fn relation_tables_invalidate() {
        let tracker = InvalidationTracker::new();
        let mut observation = tracker.observe_query(&AUTHORS_WITH_BOOKS, &["author"]);

        assert_eq!(
            observation.tables().iter().collect::<Vec<_>>(),
            vec!["author", "book"]
        );
        assert!(!observation.is_stale());

        tracker.notify("book");
        assert!(observation.is_stale());

        observation.refresh();
        assert!(!observation.is_stale());
    }

    #[test]
    fn unrelated_tables_are_ignored() {
        let tracker = InvalidationTracker::new();
        let observation = tracker.observe(vec!["author"]);

        tracker.notify("publisher");
        assert!(!observation.is_stale());
    }
}
