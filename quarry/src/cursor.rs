//!
//! Cursors over raw result rows.
//!

use crate::value::{FromValue, Value};
use crate::{QuarryError, QuarryResult};

///
/// A forward-only view over the rows of a query result.
///
/// A freshly returned cursor is positioned _before_ the first row;
/// `move_to_next` must be called before reading any value.
///
/// Moving forward may invalidate previously read rows, so a cursor cannot
/// be iterated twice. Code that needs to revisit rows (e.g. to collect
/// relation keys before converting) works on a [`MemoryCursor`] snapshot
/// produced by [`copy_cursor`].
///
pub trait Cursor {
    fn move_to_next(&mut self) -> bool;

    fn column_names(&self) -> &[String];

    fn value(&self, index: usize) -> QuarryResult<&Value>;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn move_to_next(&mut self) -> bool {
        (**self).move_to_next()
    }

    fn column_names(&self) -> &[String] {
        (**self).column_names()
    }

    fn value(&self, index: usize) -> QuarryResult<&Value> {
        (**self).value(index)
    }
}

/// Typed accessors available on every [`Cursor`].
pub trait CursorExt: Cursor {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names()
            .iter()
            .position(|column| column.as_str() == name)
    }

    fn column_index_or_err(&self, name: &str) -> QuarryResult<usize> {
        self.column_index(name)
            .ok_or_else(|| QuarryError::UnknownColumn(name.to_owned()))
    }

    fn get<T: FromValue>(&self, index: usize) -> QuarryResult<T> {
        T::from_value(self.value(index)?)
    }

    fn is_null(&self, index: usize) -> QuarryResult<bool> {
        Ok(self.value(index)?.is_null())
    }
}

impl<C: Cursor + ?Sized> CursorExt for C {}

///
/// A fully materialized, re-iterable cursor.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
}

impl MemoryCursor {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
            position: None,
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> QuarryResult<Self> {
        let mut cursor = Self::new(columns);
        for row in rows {
            cursor.push_row(row)?;
        }
        Ok(cursor)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> QuarryResult<()> {
        if row.len() != self.columns.len() {
            return Err(QuarryError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Move all rows of `other` to the end of this cursor.
    pub fn append(&mut self, other: MemoryCursor) -> QuarryResult<()> {
        for row in other.rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewind to the position before the first row.
    pub fn reset(&mut self) {
        self.position = None;
    }
}

impl Cursor for MemoryCursor {
    fn move_to_next(&mut self) -> bool {
        let next = self.position.map_or(0, |position| position + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn value(&self, index: usize) -> QuarryResult<&Value> {
        let row = self
            .position
            .and_then(|position| self.rows.get(position))
            .ok_or(QuarryError::CursorPosition)?;

        row.get(index).ok_or(QuarryError::ColumnIndex {
            index,
            count: self.columns.len(),
        })
    }
}

///
/// Drain the remaining rows of `cursor` into an independent snapshot.
///
/// The returned cursor is positioned before its first row and can be
/// rewound with [`MemoryCursor::reset`].
///
pub fn copy_cursor<C: Cursor + ?Sized>(cursor: &mut C) -> QuarryResult<MemoryCursor> {
    let mut copy = MemoryCursor::new(cursor.column_names().to_vec());
    let width = copy.columns.len();

    while cursor.move_to_next() {
        let row = (0..width)
            .map(|index| cursor.value(index).map(Clone::clone))
            .collect::<QuarryResult<Vec<_>>>()?;
        copy.rows.push(row);
    }

    tracing::trace!(rows = copy.len(), columns = width, "copied cursor");

    Ok(copy)
}
