use std::convert::TryFrom;

use crate::{QuarryError, QuarryResult};

/// A single column value, as read from a cursor.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The key used to match parent rows with related rows.
    ///
    /// `NULL` never matches anything, and floating point columns
    /// are not usable as relation keys.
    pub fn to_key(&self) -> Option<RelationKey> {
        match self {
            Self::Integer(value) => Some(RelationKey::Integer(*value)),
            Self::Text(value) => Some(RelationKey::Text(value.clone())),
            Self::Blob(value) => Some(RelationKey::Blob(value.clone())),
            Self::Null | Self::Real(_) => None,
        }
    }
}

/// Totally ordered subset of [`Value`] used for grouping related rows.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RelationKey {
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<RelationKey> for Value {
    fn from(key: RelationKey) -> Self {
        match key {
            RelationKey::Integer(value) => Self::Integer(value),
            RelationKey::Text(value) => Self::Text(value),
            RelationKey::Blob(value) => Self::Blob(value),
        }
    }
}

///
/// Conversion of a column [`Value`] into a Rust type.
///
/// Generated row conversion code calls this once per column per row.
///
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> QuarryResult<Self>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> QuarryResult<T> {
    Err(QuarryError::TypeMismatch {
        expected,
        found: value.type_name(),
    })
}

macro_rules! integer_from_value {
    ($($ty:ident),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> QuarryResult<Self> {
                    match value {
                        Value::Integer(integer) => {
                            $ty::try_from(*integer).map_err(|_| QuarryError::OutOfRange(stringify!($ty)))
                        }
                        other => mismatch(stringify!($ty), other),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, u8, u16, u32);

impl FromValue for i64 {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Integer(integer) => Ok(*integer),
            other => mismatch("i64", other),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Integer(integer) => {
                u64::try_from(*integer).map_err(|_| QuarryError::OutOfRange("u64"))
            }
            other => mismatch("u64", other),
        }
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Integer(integer) => {
                usize::try_from(*integer).map_err(|_| QuarryError::OutOfRange("usize"))
            }
            other => mismatch("usize", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Integer(integer) => Ok(*integer != 0),
            other => mismatch("bool", other),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(value as i64)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Real(real) => Ok(*real),
            Value::Integer(integer) => Ok(*integer as f64),
            other => mismatch("f64", other),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        f64::from_value(value).map(|real| real as f32)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Text(text) => Ok(text.clone()),
            other => mismatch("String", other),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Blob(blob) => Ok(blob.clone()),
            other => mismatch("Vec<u8>", other),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> QuarryResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
