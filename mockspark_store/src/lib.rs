// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory tabular store for `MockSpark`.
//!
//! This crate is the storage layer underneath the deferred pipeline. It provides:
//! - construction from a small closed set of input shapes ([`TableInput`]),
//! - the transformations the pipeline needs: mask filter, add-or-replace column,
//!   projection, relational merge, and export to row records, and
//! - vectorized column expressions ([`Column`], [`Mask`]) for writing predicates.
//!
//! It does no planning or optimization: every method runs eagerly over owned columns of
//! [`Value`]s.

#![no_std]

extern crate alloc;

mod column;
mod input;
mod merge;
mod row;
mod table;
mod value;

pub use column::{Column, Mask, Operand};
pub use input::TableInput;
pub use merge::{JoinKind, JoinOn, MergeOptions};
pub use row::Row;
pub use table::{SortOrder, TableFrame, TableFrameError};
pub use value::Value;
