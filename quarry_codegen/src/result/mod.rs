//!
//! Query result adapters.
//!
//! A query result adapter emits the logic converting a whole cursor into the
//! declared return type of a query. Every result shape (single value, list,
//! map, stream, ...) is one implementation of [`QueryResultAdapter`]; each
//! shape decides how many rows it reads and in which order, and delegates the
//! conversion of every row to its [`RowAdapter`].
//!

use std::collections::BTreeSet;

use crate::row::RowAdapter;
use crate::CodeGenScope;

mod cursor;
mod list;
mod map;
mod single;

pub use cursor::{CursorResultAdapter, RowCountResultAdapter};
pub use list::{ListResultAdapter, StreamResultAdapter};
pub use map::{MapKind, MapResultAdapter, MultimapResultAdapter};
pub use single::{OptionalResultAdapter, SingleResultAdapter};

///
/// Gets a cursor and converts it into the return type of a query.
///
/// The driver asks [`should_copy_cursor`](Self::should_copy_cursor) first,
/// copies the cursor if required, and only then calls
/// [`convert`](Self::convert) with the variable holding the cursor to read.
///
pub trait QueryResultAdapter {
    /// The row adapter invoked per row, if this shape reads rows at all.
    fn row_adapter(&self) -> Option<&dyn RowAdapter>;

    /// Emit statements that leave the converted result in `out`.
    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope);

    /// Whether the cursor must be copied before converting.
    ///
    /// Relation collectors iterate the cursor once to collect keys and
    /// rewind it before conversion, which a forward-only cursor cannot do.
    fn should_copy_cursor(&self) -> bool {
        self.row_adapter()
            .and_then(|row| row.relation_info())
            .map_or(false, |info| !info.collectors().is_empty())
    }

    /// Tables read by relation fetches, in addition to those of the query itself.
    fn accessed_table_names(&self) -> BTreeSet<String> {
        self.row_adapter()
            .and_then(|row| row.relation_info())
            .map(|info| info.table_names())
            .unwrap_or_default()
    }
}

/// Compact spelling of a type for runtime error messages.
fn type_name(row: &dyn RowAdapter) -> String {
    row.out_type().to_string().replace(' ', "")
}
