// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned table representation used by the pipeline executor.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashSet;

use crate::{Column, Mask, Row, TableInput, Value};

/// Errors returned when building or transforming a [`TableFrame`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableFrameError {
    /// A referenced column does not exist.
    #[error("column not found: {name}")]
    ColumnNotFound {
        /// The requested column name.
        name: String,
    },
    /// Two columns would share a name.
    #[error("duplicate column: {name}")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },
    /// A column in a column mapping has a different length than the first one.
    #[error("column {column} has {actual} values, expected {expected}")]
    LengthMismatch {
        /// The offending column.
        column: String,
        /// Length of the first column.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },
    /// A tuple has a different width than the first one.
    #[error("row {row} has {actual} fields, expected {expected}")]
    RaggedRow {
        /// Index of the offending tuple.
        row: usize,
        /// Width of the first tuple.
        expected: usize,
        /// Width of the offending tuple.
        actual: usize,
    },
    /// The input cannot be read as a table at all.
    #[error("unsupported input shape: {0}")]
    UnsupportedShape(String),
    /// A mask or value sequence does not have one entry per row.
    #[error("expected {expected} entries (one per row), got {actual}")]
    ShapeMismatch {
        /// Row count of the table (or length of the left operand).
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
    /// An operator was applied to values it does not support.
    #[error("cannot apply `{op}` to {left} and {right}")]
    TypeMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Type of the left operand.
        left: &'static str,
        /// Type of the right operand.
        right: &'static str,
    },
    /// Integer arithmetic overflowed.
    #[error("integer overflow in `{op}`")]
    Overflow {
        /// Operator symbol.
        op: &'static str,
    },
    /// A merge has no key columns: a natural merge of tables that share no column names, or
    /// an empty key list.
    #[error("no common columns to merge on")]
    NoCommonColumns,
}

/// Sorting order for [`TableFrame::sort_by`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// An owned, rectangular table: named columns of equal length.
///
/// Transformations consume the frame and return the transformed one; callers that need to
/// keep the original clone it first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFrame {
    columns: Vec<Column>,
    row_count: usize,
}

impl TableFrame {
    /// Builds a frame from any supported input shape.
    ///
    /// See [`TableInput`] for the normalization rules.
    pub fn new(input: impl Into<TableInput>) -> Result<Self, TableFrameError> {
        input.into().into_frame()
    }

    /// Builds a frame from row records. Equivalent to [`TableInput::Records`].
    pub fn from_records(records: impl IntoIterator<Item = Row>) -> Result<Self, TableFrameError> {
        TableInput::Records(records.into_iter().collect()).into_frame()
    }

    /// Builds a frame from columns, checking names are unique and lengths agree.
    ///
    /// `row_count` is only consulted when `columns` is empty.
    pub fn from_columns(columns: Vec<Column>, row_count: usize) -> Result<Self, TableFrameError> {
        let Some(first) = columns.first() else {
            return Ok(Self {
                columns,
                row_count,
            });
        };
        let expected = first.len();
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(TableFrameError::DuplicateColumn {
                    name: col.name().into(),
                });
            }
            if col.len() != expected {
                return Err(TableFrameError::LengthMismatch {
                    column: col.name().into(),
                    expected,
                    actual: col.len(),
                });
            }
        }
        drop(seen);
        Ok(Self {
            columns,
            row_count: expected,
        })
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns all columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    /// Returns a column index for a name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns `true` if a column with this name exists.
    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, TableFrameError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| TableFrameError::ColumnNotFound { name: name.into() })
    }

    /// Gets a value for a row/column if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).ok()?.get(row)
    }

    /// Keeps the rows where `mask` is `true`, preserving their relative order.
    pub fn filter(self, mask: &Mask) -> Result<Self, TableFrameError> {
        if mask.len() != self.row_count {
            return Err(TableFrameError::ShapeMismatch {
                expected: self.row_count,
                actual: mask.len(),
            });
        }
        let keep: Vec<usize> = mask
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        Ok(self.take_rows(&keep))
    }

    /// Replaces the values of column `name`, or appends it as the last column.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self, TableFrameError> {
        if values.len() != self.row_count {
            return Err(TableFrameError::ShapeMismatch {
                expected: self.row_count,
                actual: values.len(),
            });
        }
        let name = name.into();
        let column = Column::new(name, values);
        match self.column_index(column.name()) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Keeps exactly the named columns, in the given order.
    pub fn select<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, TableFrameError> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if out.iter().any(|c: &Column| c.name() == name) {
                return Err(TableFrameError::DuplicateColumn { name: name.into() });
            }
            let idx = self
                .column_index(name)
                .ok_or_else(|| TableFrameError::ColumnNotFound { name: name.into() })?;
            out.push(self.columns[idx].clone());
        }
        self.columns = out;
        Ok(self)
    }

    /// Removes the named columns. Every name must exist.
    pub fn drop<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, TableFrameError> {
        for name in names {
            let name = name.as_ref();
            let idx = self
                .column_index(name)
                .ok_or_else(|| TableFrameError::ColumnNotFound { name: name.into() })?;
            self.columns.remove(idx);
        }
        Ok(self)
    }

    /// Renames column `existing` to `new`.
    ///
    /// Renaming a column that does not exist is a no-op, matching the distributed API.
    pub fn rename(
        mut self,
        existing: &str,
        new: impl Into<String>,
    ) -> Result<Self, TableFrameError> {
        let Some(idx) = self.column_index(existing) else {
            return Ok(self);
        };
        let new = new.into();
        if new != existing && self.contains_column(&new) {
            return Err(TableFrameError::DuplicateColumn { name: new });
        }
        self.columns[idx].set_name(new);
        Ok(self)
    }

    /// Stable sort by one column. Missing values (`Null`, `NaN`) sort last in both orders.
    pub fn sort_by(self, name: &str, order: SortOrder) -> Result<Self, TableFrameError> {
        let key = self.column(name)?;
        let mut present = key.values().iter().filter(|v| !v.is_missing());
        if let Some(first) = present.next() {
            if let Some(bad) = present.find(|v| !first.is_orderable_with(v)) {
                return Err(TableFrameError::TypeMismatch {
                    op: "sort",
                    left: first.type_name(),
                    right: bad.type_name(),
                });
            }
        }
        let values = key.values();
        let mut rows: Vec<usize> = (0..self.row_count).collect();
        rows.sort_by(|&a, &b| {
            let (va, vb) = (&values[a], &values[b]);
            match (va.is_missing(), vb.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = va.try_cmp(vb).unwrap_or(Ordering::Equal);
                    match order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    }
                }
            }
        });
        Ok(self.take_rows(&rows))
    }

    /// Keeps the first `n` rows.
    pub fn head(self, n: usize) -> Self {
        if n >= self.row_count {
            return self;
        }
        let rows: Vec<usize> = (0..n).collect();
        self.take_rows(&rows)
    }

    /// Returns row `index` as a record.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count {
            return None;
        }
        let mut row = Row::with_capacity(self.columns.len());
        for col in &self.columns {
            row.push_unchecked(col.name().into(), col.values()[index].clone());
        }
        Some(row)
    }

    /// Exports every row as a record, in row order.
    pub fn to_records(&self) -> Vec<Row> {
        (0..self.row_count).filter_map(|i| self.row(i)).collect()
    }

    pub(crate) fn take_rows(self, rows: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| c.take(rows.iter().copied()))
                .collect(),
            row_count: rows.len(),
        }
    }
}
