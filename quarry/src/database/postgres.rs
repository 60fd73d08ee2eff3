use async_trait::async_trait;
use sqlx::encode::IsNull;
use sqlx::postgres::{PgArgumentBuffer, PgPool, PgRow, PgTypeInfo, Postgres};
use sqlx::{Column, Executor, Row, Statement, TypeInfo};

use super::Connection;
use crate::cursor::{Cursor, MemoryCursor};
use crate::value::Value;
use crate::{QuarryError, QuarryResult};

#[async_trait]
impl Connection for PgPool {
    async fn query(&self, sql: &str, args: &[Value]) -> QuarryResult<Box<dyn Cursor + Send>> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = match arg.clone() {
                Value::Null => query.bind(UntypedNull),
                Value::Integer(integer) => query.bind(integer),
                Value::Real(real) => query.bind(real),
                Value::Text(text) => query.bind(text),
                Value::Blob(blob) => query.bind(blob),
            };
        }

        let rows = query.fetch_all(self).await.map_err(database_error)?;

        tracing::debug!(rows = rows.len(), "postgres query");

        // Generated code resolves columns before the first row.
        let columns = match rows.first() {
            Some(row) => column_names(row.columns()),
            None => {
                let statement = self.prepare(sql).await.map_err(database_error)?;
                column_names(statement.columns())
            }
        };

        Ok(Box::new(rows_to_cursor(columns, &rows)?))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}

fn database_error(error: sqlx::Error) -> QuarryError {
    QuarryError::Database(error.to_string())
}

/// A NULL parameter whose type the server infers from its use.
struct UntypedNull;

impl sqlx::Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("unknown")
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _: &mut PgArgumentBuffer) -> IsNull {
        IsNull::Yes
    }
}

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns
        .iter()
        .map(|column| column.name().to_owned())
        .collect()
}

///
/// Decode fetched rows into a [`MemoryCursor`].
///
/// `columns` come from the statement, so an empty result still
/// knows its columns.
///
pub fn rows_to_cursor(columns: Vec<String>, rows: &[PgRow]) -> QuarryResult<MemoryCursor> {
    let mut cursor = MemoryCursor::new(columns);
    for row in rows {
        cursor.push_row(decode_row(row)?)?;
    }

    Ok(cursor)
}

fn decode_row(row: &PgRow) -> QuarryResult<Vec<Value>> {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            let value = match column.type_info().name() {
                "BOOL" => decode::<bool>(row, index)?.map(Value::from),
                "INT2" => decode::<i16>(row, index)?.map(Value::from),
                "INT4" => decode::<i32>(row, index)?.map(Value::from),
                "INT8" => decode::<i64>(row, index)?.map(Value::from),
                "FLOAT4" => decode::<f32>(row, index)?.map(Value::from),
                "FLOAT8" => decode::<f64>(row, index)?.map(Value::from),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                    decode::<String>(row, index)?.map(Value::from)
                }
                "BYTEA" => decode::<Vec<u8>>(row, index)?.map(Value::from),
                other => {
                    return Err(QuarryError::UnsupportedColumnType {
                        column: column.name().to_owned(),
                        ty: other.to_owned(),
                    })
                }
            };
            Ok(value.unwrap_or(Value::Null))
        })
        .collect()
}

fn decode<'r, T>(row: &'r PgRow, index: usize) -> QuarryResult<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(index).map_err(database_error)
}
