// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The deferred pipeline and its materialization.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use mockspark_store::{
    JoinKind, JoinOn, Mask, MergeOptions, Row, SortOrder, TableFrame, TableFrameError, TableInput,
    Value,
};
use tracing::{debug, trace};

use crate::operation::{Operation, OperationKind, Predicate, ValueFn};

/// Errors returned by pipeline construction and materialization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// The input could not be normalized into a rectangular table.
    #[error("unsupported data for pipeline: {0}")]
    UnsupportedInput(#[source] TableFrameError),
    /// A step referenced a column that does not exist at that point in the sequence.
    #[error("step {step} ({kind}): column not found: {name}")]
    ColumnNotFound {
        /// Position of the failing step.
        step: usize,
        /// Kind of the failing step.
        kind: OperationKind,
        /// The missing column.
        name: String,
    },
    /// A mask or derived column did not have one entry per row.
    #[error("step {step} ({kind}): expected {expected} entries (one per row), got {actual}")]
    ShapeMismatch {
        /// Position of the failing step.
        step: usize,
        /// Kind of the failing step.
        kind: OperationKind,
        /// Row count at that step.
        expected: usize,
        /// Length that was produced.
        actual: usize,
    },
    /// Any other failure while applying a step.
    #[error("step {step} ({kind}) failed: {source}")]
    Operation {
        /// Position of the failing step.
        step: usize,
        /// Kind of the failing step.
        kind: OperationKind,
        /// The underlying error.
        #[source]
        source: TableFrameError,
    },
}

impl PipelineError {
    fn at_step(step: usize, kind: OperationKind, err: TableFrameError) -> Self {
        match err {
            TableFrameError::ColumnNotFound { name } => Self::ColumnNotFound { step, kind, name },
            TableFrameError::ShapeMismatch { expected, actual } => Self::ShapeMismatch {
                step,
                kind,
                expected,
                actual,
            },
            source => Self::Operation { step, kind, source },
        }
    }

    /// Position of the failing step, if the error came from materialization.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::UnsupportedInput(_) => None,
            Self::ColumnNotFound { step, .. }
            | Self::ShapeMismatch { step, .. }
            | Self::Operation { step, .. } => Some(*step),
        }
    }
}

/// Anything that can be the right-hand side of [`Pipeline::join`].
///
/// A pipeline contributes its source snapshot as it is when `join` is called; its own pending
/// operations are not replayed. Materialize it first (see [`Pipeline::to_frame`]) to join
/// against its transformed state.
pub trait JoinSource {
    /// Returns the frame to merge with.
    fn into_snapshot(self) -> Arc<TableFrame>;
}

impl JoinSource for &Pipeline {
    fn into_snapshot(self) -> Arc<TableFrame> {
        Arc::clone(&self.snapshot)
    }
}

impl JoinSource for TableFrame {
    fn into_snapshot(self) -> Arc<TableFrame> {
        Arc::new(self)
    }
}

impl JoinSource for &TableFrame {
    fn into_snapshot(self) -> Arc<TableFrame> {
        Arc::new(self.clone())
    }
}

impl JoinSource for Arc<TableFrame> {
    fn into_snapshot(self) -> Arc<TableFrame> {
        self
    }
}

/// A source snapshot plus an ordered list of pending operations.
///
/// Builder methods only record operations and return the same pipeline, so calls chain:
///
/// ```
/// # use mockspark_pipeline::{Pipeline, Row, Value};
/// let mut df = Pipeline::from_records([
///     Row::from([("id", Value::Int(1)), ("age", Value::Int(25))]),
///     Row::from([("id", Value::Int(2)), ("age", Value::Int(30))]),
/// ])?;
/// df.filter(|s| s.column("age")?.gt(28))
///     .with_column("next", |s| s.column("age")?.add(1))
///     .select(["id", "next"]);
/// let rows = df.materialize()?;
/// assert_eq!(rows, vec![Row::from([("id", Value::Int(2)), ("next", Value::Int(31))])]);
/// # Ok::<(), mockspark_pipeline::PipelineError>(())
/// ```
///
/// Nothing is validated until [`materialize`](Self::materialize); each materialization starts
/// again from the untouched snapshot.
#[derive(Debug, Clone)]
pub struct Pipeline {
    snapshot: Arc<TableFrame>,
    ops: Vec<Operation>,
    merge_options: MergeOptions,
}

impl Pipeline {
    /// Builds a pipeline from any supported input shape.
    pub fn new(data: impl Into<TableInput>) -> Result<Self, PipelineError> {
        let frame = TableFrame::new(data).map_err(PipelineError::UnsupportedInput)?;
        Ok(Self::from_frame(frame))
    }

    /// Builds a pipeline from row records.
    pub fn from_records(records: impl IntoIterator<Item = Row>) -> Result<Self, PipelineError> {
        let frame = TableFrame::from_records(records).map_err(PipelineError::UnsupportedInput)?;
        Ok(Self::from_frame(frame))
    }

    /// Builds a pipeline from a JSON array of objects, object of arrays, or array of arrays.
    #[cfg(feature = "json")]
    pub fn from_json(data: &serde_json::Value) -> Result<Self, PipelineError> {
        let input = TableInput::from_json(data).map_err(PipelineError::UnsupportedInput)?;
        Self::new(input)
    }

    /// Wraps an existing frame without copying it.
    pub fn from_frame(frame: TableFrame) -> Self {
        Self {
            snapshot: Arc::new(frame),
            ops: Vec::new(),
            merge_options: MergeOptions::default(),
        }
    }

    /// The source data this pipeline was built from.
    pub fn snapshot(&self) -> &TableFrame {
        &self.snapshot
    }

    /// Pending operations in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Options captured by subsequent [`join`](Self::join) calls.
    pub fn merge_options(&self) -> &MergeOptions {
        &self.merge_options
    }

    /// Sets the options captured by subsequent [`join`](Self::join) calls.
    pub fn set_merge_options(&mut self, options: MergeOptions) -> &mut Self {
        self.merge_options = options;
        self
    }

    /// Keeps the rows for which `predicate` yields `true`.
    pub fn filter<F, M>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&TableFrame) -> Result<M, TableFrameError> + Send + Sync + 'static,
        M: Into<Mask>,
    {
        let predicate: Predicate =
            Arc::new(move |frame: &TableFrame| -> Result<Mask, TableFrameError> {
                predicate(frame).map(Into::into)
            });
        self.push(Operation::Filter { predicate })
    }

    /// Adds column `name` (or replaces it) with the values produced by `values`.
    pub fn with_column<F, V>(&mut self, name: impl Into<String>, values: F) -> &mut Self
    where
        F: Fn(&TableFrame) -> Result<V, TableFrameError> + Send + Sync + 'static,
        V: Into<Vec<Value>>,
    {
        let values: ValueFn =
            Arc::new(move |frame: &TableFrame| -> Result<Vec<Value>, TableFrameError> {
                values(frame).map(Into::into)
            });
        self.push(Operation::WithColumn {
            name: name.into(),
            values,
        })
    }

    /// Keeps exactly these columns, in this order.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.push(Operation::Select { columns })
    }

    /// Merges with `other` on `on`.
    pub fn join(
        &mut self,
        other: impl JoinSource,
        on: impl Into<JoinOn>,
        how: JoinKind,
    ) -> &mut Self {
        let options = self.merge_options.clone();
        self.push(Operation::Join {
            other: other.into_snapshot(),
            on: on.into(),
            how,
            options,
        })
    }

    /// Same as [`join`](Self::join).
    pub fn merge(
        &mut self,
        other: impl JoinSource,
        on: impl Into<JoinOn>,
        how: JoinKind,
    ) -> &mut Self {
        self.join(other, on, how)
    }

    /// Renames `existing` to `new`; a no-op if `existing` is absent at that step.
    pub fn with_column_renamed(
        &mut self,
        existing: impl Into<String>,
        new: impl Into<String>,
    ) -> &mut Self {
        self.push(Operation::WithColumnRenamed {
            existing: existing.into(),
            new: new.into(),
        })
    }

    /// Removes columns.
    pub fn drop<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.push(Operation::Drop { columns })
    }

    /// Stable sort by one column; missing values go last.
    pub fn order_by(&mut self, column: impl Into<String>, order: SortOrder) -> &mut Self {
        self.push(Operation::Sort {
            by: column.into(),
            order,
        })
    }

    /// Keeps at most the first `n` rows.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.push(Operation::Limit { n })
    }

    fn push(&mut self, op: Operation) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Replays every pending operation over a copy of the snapshot and returns the result.
    pub fn to_frame(&self) -> Result<TableFrame, PipelineError> {
        debug!(
            rows = self.snapshot.row_count(),
            columns = self.snapshot.column_count(),
            ops = self.ops.len(),
            "materializing pipeline"
        );
        let mut frame = TableFrame::clone(&self.snapshot);
        for (step, op) in self.ops.iter().enumerate() {
            let kind = op.kind();
            frame = op.apply(frame).map_err(|err| {
                debug!(step, %kind, error = %err, "pipeline step failed");
                PipelineError::at_step(step, kind, err)
            })?;
            trace!(step, %kind, rows = frame.row_count(), "applied pipeline step");
        }
        debug!(rows = frame.row_count(), "materialized pipeline");
        Ok(frame)
    }

    /// Replays every pending operation and returns the result as row records.
    pub fn materialize(&self) -> Result<Vec<Row>, PipelineError> {
        Ok(self.to_frame()?.to_records())
    }

    /// Same as [`materialize`](Self::materialize).
    pub fn collect(&self) -> Result<Vec<Row>, PipelineError> {
        self.materialize()
    }

    /// Number of rows the pipeline produces.
    pub fn count(&self) -> Result<usize, PipelineError> {
        Ok(self.to_frame()?.row_count())
    }
}

impl From<TableFrame> for Pipeline {
    fn from(frame: TableFrame) -> Self {
        Self::from_frame(frame)
    }
}
