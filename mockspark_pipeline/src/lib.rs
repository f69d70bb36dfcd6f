// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A local stand-in for a distributed dataframe API.
//!
//! This crate provides:
//! - a [`Pipeline`] that records filter / column / projection / join steps without running
//!   them, and
//! - a materialization step that replays those steps, in order, over a copy of the source data
//!   and returns [`Row`] records.
//!
//! It is meant for unit-testing and debugging ETL logic on small in-memory datasets:
//! - there is no planner: steps run exactly as written,
//! - every [`Pipeline::materialize`] starts again from the untouched source snapshot, and
//! - errors (unknown columns, masks of the wrong length, type errors) surface at
//!   materialization and name the failing step.

#![no_std]

extern crate alloc;

mod operation;
mod pipeline;
mod session;

pub use mockspark_store::{
    Column, JoinKind, JoinOn, Mask, MergeOptions, Operand, Row, SortOrder, TableFrame,
    TableFrameError, TableInput, Value,
};
pub use operation::{Operation, OperationKind, Predicate, ValueFn};
pub use pipeline::{JoinSource, Pipeline, PipelineError};
pub use session::{Session, SessionConfig};
