// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred operation IR.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use mockspark_store::{
    JoinKind, JoinOn, Mask, MergeOptions, SortOrder, TableFrame, TableFrameError, Value,
};

/// A row predicate: one boolean per row of the frame it is given.
pub type Predicate = Arc<dyn Fn(&TableFrame) -> Result<Mask, TableFrameError> + Send + Sync>;

/// A derived column: one value per row of the frame it is given.
pub type ValueFn = Arc<dyn Fn(&TableFrame) -> Result<Vec<Value>, TableFrameError> + Send + Sync>;

/// The kind of an [`Operation`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// [`Operation::Filter`].
    Filter,
    /// [`Operation::WithColumn`].
    WithColumn,
    /// [`Operation::Select`].
    Select,
    /// [`Operation::Join`].
    Join,
    /// [`Operation::WithColumnRenamed`].
    WithColumnRenamed,
    /// [`Operation::Drop`].
    Drop,
    /// [`Operation::Sort`].
    Sort,
    /// [`Operation::Limit`].
    Limit,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::WithColumn => "withColumn",
            Self::Select => "select",
            Self::Join => "join",
            Self::WithColumnRenamed => "withColumnRenamed",
            Self::Drop => "drop",
            Self::Sort => "orderBy",
            Self::Limit => "limit",
        })
    }
}

/// One pending step of a pipeline: a pure `TableFrame -> TableFrame` function.
#[derive(Clone)]
pub enum Operation {
    /// Keep only rows where the predicate is `true`.
    Filter {
        /// Mask producer, evaluated against the frame at this step.
        predicate: Predicate,
    },
    /// Add a column, or replace it if the name exists.
    WithColumn {
        /// Output column name.
        name: String,
        /// Value producer, evaluated against the frame at this step.
        values: ValueFn,
    },
    /// Keep exactly these columns, in this order.
    Select {
        /// Columns to include in the output.
        columns: Vec<String>,
    },
    /// Merge with another frame.
    Join {
        /// The right-hand side, as it was when the join was requested.
        other: Arc<TableFrame>,
        /// Key columns.
        on: JoinOn,
        /// Which unmatched rows to keep.
        how: JoinKind,
        /// Suffixes for overlapping columns.
        options: MergeOptions,
    },
    /// Rename a column; a no-op if it does not exist.
    WithColumnRenamed {
        /// Current name.
        existing: String,
        /// New name.
        new: String,
    },
    /// Remove columns.
    Drop {
        /// Columns to remove.
        columns: Vec<String>,
    },
    /// Stable reorder of rows by one column.
    Sort {
        /// Column used as the sort key.
        by: String,
        /// Sort order.
        order: SortOrder,
    },
    /// Keep the first `n` rows.
    Limit {
        /// Maximum number of rows.
        n: usize,
    },
}

impl Operation {
    /// Returns the kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Filter { .. } => OperationKind::Filter,
            Self::WithColumn { .. } => OperationKind::WithColumn,
            Self::Select { .. } => OperationKind::Select,
            Self::Join { .. } => OperationKind::Join,
            Self::WithColumnRenamed { .. } => OperationKind::WithColumnRenamed,
            Self::Drop { .. } => OperationKind::Drop,
            Self::Sort { .. } => OperationKind::Sort,
            Self::Limit { .. } => OperationKind::Limit,
        }
    }

    /// Applies this step to `frame`.
    pub fn apply(&self, frame: TableFrame) -> Result<TableFrame, TableFrameError> {
        match self {
            Self::Filter { predicate } => {
                let mask = predicate(&frame)?;
                frame.filter(&mask)
            }
            Self::WithColumn { name, values } => {
                let values = values(&frame)?;
                frame.with_column(name.clone(), values)
            }
            Self::Select { columns } => frame.select(columns.as_slice()),
            Self::Join {
                other,
                on,
                how,
                options,
            } => frame.merge(other, on, *how, options),
            Self::WithColumnRenamed { existing, new } => frame.rename(existing, new.clone()),
            Self::Drop { columns } => frame.drop(columns.as_slice()),
            Self::Sort { by, order } => frame.sort_by(by, *order),
            Self::Limit { n } => Ok(frame.head(*n)),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter { .. } => f.debug_struct("Filter").finish_non_exhaustive(),
            Self::WithColumn { name, .. } => f
                .debug_struct("WithColumn")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Select { columns } => f.debug_struct("Select").field("columns", columns).finish(),
            Self::Join {
                other,
                on,
                how,
                options,
            } => f
                .debug_struct("Join")
                .field("other_rows", &other.row_count())
                .field("on", on)
                .field("how", how)
                .field("options", options)
                .finish(),
            Self::WithColumnRenamed { existing, new } => f
                .debug_struct("WithColumnRenamed")
                .field("existing", existing)
                .field("new", new)
                .finish(),
            Self::Drop { columns } => f.debug_struct("Drop").field("columns", columns).finish(),
            Self::Sort { by, order } => f
                .debug_struct("Sort")
                .field("by", by)
                .field("order", order)
                .finish(),
            Self::Limit { n } => f.debug_struct("Limit").field("n", n).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    use mockspark_store::{Row, TableInput};

    use super::*;

    fn frame() -> TableFrame {
        TableFrame::new(TableInput::columns([
            ("id", vec![Value::Int(1), Value::Int(2)]),
            ("v", vec![Value::Int(10), Value::Int(20)]),
        ]))
        .unwrap()
    }

    #[test]
    fn filter_with_wrong_mask_length_is_a_shape_error() {
        let op = Operation::Filter {
            predicate: Arc::new(|_: &TableFrame| -> Result<Mask, TableFrameError> {
                Ok(Mask::new(vec![true]))
            }),
        };
        assert_eq!(
            op.apply(frame()).unwrap_err(),
            TableFrameError::ShapeMismatch {
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn join_uses_captured_options() {
        let other = TableFrame::from_records([Row::from([("id", Value::Int(2)), ("v", 5.into())])])
            .unwrap();
        let op = Operation::Join {
            other: Arc::new(other),
            on: "id".into(),
            how: JoinKind::Inner,
            options: MergeOptions {
                suffixes: ("_l".into(), "_r".into()),
            },
        };
        let out = op.apply(frame()).unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["id", "v_l", "v_r"]);
    }

    #[test]
    fn debug_hides_closures() {
        let op = Operation::WithColumn {
            name: "x".into(),
            values: Arc::new(|f: &TableFrame| -> Result<Vec<Value>, TableFrameError> {
                Ok(vec![Value::Null; f.row_count()])
            }),
        };
        assert_eq!(format!("{op:?}"), r#"WithColumn { name: "x", .. }"#);
        assert_eq!(op.kind().to_string(), "withColumn");
    }
}
