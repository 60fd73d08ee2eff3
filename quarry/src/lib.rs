//!
//! ```text
//! query ──> cursor ──(copy?)──> snapshot ──> rows ──> typed result
//!                                  │
//!                                  └──> relation keys ──> secondary queries
//! ```
//!
//! `quarry` is the runtime half of the query-result generator. The
//! `#[quarry::database]` macro emits async query functions that run against a
//! [`Connection`] and turn the returned [`Cursor`] into the declared return
//! type of each query.
//!

pub use async_trait::async_trait;
pub use quarry_macros::*;

pub mod database;
pub mod relation;
pub mod stream;
pub mod tracker;

mod cursor;
mod query;
mod value;

pub use cursor::{copy_cursor, Cursor, CursorExt, MemoryCursor};
pub use database::Connection;
pub use query::{QueryInfo, RowCount};
pub use stream::RowStream;
pub use tracker::{InvalidationTracker, Observation};
pub use value::{FromValue, RelationKey, Value};

#[derive(thiserror::Error, Debug, Clone)]
pub enum QuarryError {
    #[error("Query returned no rows, expected a value of type `{expected}`")]
    EmptyResult { expected: &'static str },

    #[error("Unknown column `{0}`")]
    UnknownColumn(String),

    #[error("Column index {index} out of range for {count} columns")]
    ColumnIndex { index: usize, count: usize },

    #[error("Cursor is not positioned on a row")]
    CursorPosition,

    #[error("Row has {found} values, expected {expected}")]
    RowWidth { expected: usize, found: usize },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Value out of range for {0}")]
    OutOfRange(&'static str),

    #[error("Unsupported type `{ty}` for column `{column}`")]
    UnsupportedColumnType { column: String, ty: String },

    #[error("Relation fetch from `{table}` failed: {source}")]
    Relation {
        table: String,
        #[source]
        source: Box<QuarryError>,
    },

    #[error("Database error: {0}")]
    Database(String),
}

pub type QuarryResult<T> = Result<T, QuarryError>;
