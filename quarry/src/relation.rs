//!
//! Secondary queries that hydrate relation fields.
//!
//! Generated code collects the distinct parent keys of a result,
//! then calls [`fetch`] once per relation field. Every row of the
//! returned cursor carries the parent key it belongs to in the
//! [`KEY_COLUMN`] column.
//!

use std::collections::BTreeSet;

use crate::cursor::{copy_cursor, MemoryCursor};
use crate::database::Connection;
use crate::value::{RelationKey, Value};
use crate::{QuarryError, QuarryResult};

/// Upper bound of bind parameters per secondary query.
pub const MAX_BIND_PARAMETERS: usize = 999;

/// Alias of the parent key column in relation cursors.
pub const KEY_COLUMN: &str = "__quarry_key";

/// A link table between the parent and the related table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Junction {
    pub table: &'static str,
    /// Junction column matching the parent key.
    pub parent_column: &'static str,
    /// Junction column matching `RelationQuery::entity_column`.
    pub entity_column: &'static str,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationQuery {
    pub table: &'static str,
    pub entity_column: &'static str,
    pub junction: Option<Junction>,
}

/// A double-quoted SQL identifier, with embedded quotes doubled.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl RelationQuery {
    pub fn sql<C: Connection + ?Sized>(&self, db: &C, key_count: usize) -> String {
        let placeholders = (1..=key_count)
            .map(|index| db.placeholder(index))
            .collect::<Vec<_>>()
            .join(", ");

        let table = quote_ident(self.table);
        let column = quote_ident(self.entity_column);
        let key = quote_ident(KEY_COLUMN);

        match &self.junction {
            None => format!(
                "SELECT {column} AS {key}, * FROM {table} WHERE {column} IN ({placeholders})",
                column = column,
                key = key,
                table = table,
                placeholders = placeholders,
            ),
            Some(junction) => format!(
                "SELECT \"_junction\".{parent} AS {key}, {table}.* FROM {junction} AS \"_junction\" INNER JOIN {table} ON \"_junction\".{link} = {table}.{column} WHERE \"_junction\".{parent} IN ({placeholders})",
                parent = quote_ident(junction.parent_column),
                key = key,
                table = table,
                junction = quote_ident(junction.table),
                link = quote_ident(junction.entity_column),
                column = column,
                placeholders = placeholders,
            ),
        }
    }

    /// All tables this query reads from.
    pub fn tables(&self) -> Vec<&'static str> {
        let mut tables = vec![self.table];
        if let Some(junction) = &self.junction {
            tables.push(junction.table);
        }
        tables
    }

    fn error(&self, source: QuarryError) -> QuarryError {
        QuarryError::Relation {
            table: self.table.to_owned(),
            source: Box::new(source),
        }
    }
}

///
/// Fetch all rows related to `keys`, chunked so no single query binds
/// more than [`MAX_BIND_PARAMETERS`] parameters.
///
/// An empty key set yields an empty cursor without querying.
///
pub async fn fetch<C: Connection + ?Sized>(
    db: &C,
    query: &RelationQuery,
    keys: BTreeSet<RelationKey>,
) -> QuarryResult<MemoryCursor> {
    let keys: Vec<Value> = keys.into_iter().map(Value::from).collect();
    let mut snapshot: Option<MemoryCursor> = None;

    for chunk in keys.chunks(MAX_BIND_PARAMETERS) {
        let sql = query.sql(db, chunk.len());

        tracing::debug!(table = query.table, keys = chunk.len(), "fetching relation");

        let mut cursor = db
            .query(&sql, chunk)
            .await
            .map_err(|err| query.error(err))?;
        let copy = copy_cursor(&mut cursor).map_err(|err| query.error(err))?;

        // An empty chunk may come back without columns.
        snapshot = Some(match snapshot.take() {
            Some(rows) if copy.is_empty() => rows,
            Some(mut rows) if !rows.is_empty() => {
                rows.append(copy).map_err(|err| query.error(err))?;
                rows
            }
            _ => copy,
        });
    }

    Ok(snapshot.unwrap_or_default())
}
