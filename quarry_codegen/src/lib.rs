//!
//! Compile-time half of `quarry`.
//!
//! The central abstraction is [`result::QueryResultAdapter`]: given the
//! declared return type of a query, it emits the logic that turns a raw
//! cursor into that type, and it reports two facts about that logic that
//! the caller needs before and after emitting it: whether the cursor must
//! be copied first, and which tables relation fetches read from.
//!

#![forbid(unsafe_code)]

pub mod database;
pub mod query;
pub mod relation;
pub mod result;
pub mod row;
pub mod schema;
pub mod solver;

mod attr {
    pub mod attr_util;
    pub mod query;
    pub mod relation;
}

mod options;
mod scope;

pub use options::Options;
pub use scope::CodeGenScope;
