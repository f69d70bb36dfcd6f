// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalization of the supported input shapes into a [`TableFrame`].

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::{Column, Row, TableFrame, TableFrameError, Value};

/// The closed set of shapes a [`TableFrame`] can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableInput {
    /// An existing frame; it is copied as-is.
    Frame(TableFrame),
    /// Row mappings. The columns are the union of all keys, in first-appearance order, and a
    /// row that lacks a key gets `Null` in that column.
    Records(Vec<Row>),
    /// Column name to values. All columns must have the same length and distinct names.
    Columns(Vec<(String, Vec<Value>)>),
    /// Fixed-width tuples. Columns are named by position: `"0"`, `"1"`, ...
    Tuples(Vec<Vec<Value>>),
}

impl TableInput {
    /// Builds a [`TableInput::Columns`] from `(name, values)` pairs.
    pub fn columns<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: Into<String>,
    {
        Self::Columns(columns.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a [`TableInput::Tuples`] from rows of anything convertible to [`Value`].
    pub fn tuples<I, T, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Tuples(
            rows.into_iter()
                .map(|t| t.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Reads a JSON document as one of the supported shapes.
    ///
    /// - an array of objects is read as records,
    /// - an object of arrays is read as columns,
    /// - an array of arrays is read as tuples.
    ///
    /// Anything else, including bare scalars, is rejected. With the `preserve_order` feature
    /// (on by default) columns keep the order their keys appear in the document; without it
    /// they follow `serde_json`'s sorted map.
    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TableFrameError> {
        use serde_json::Value as JsonValue;

        match value {
            JsonValue::Array(items) => {
                if items.iter().all(JsonValue::is_object) {
                    let mut rows = Vec::with_capacity(items.len());
                    for item in items {
                        let mut row = Row::new();
                        for (k, v) in item.as_object().into_iter().flatten() {
                            row.insert(k.clone(), Value::from_json(v)?);
                        }
                        rows.push(row);
                    }
                    Ok(Self::Records(rows))
                } else if items.iter().all(JsonValue::is_array) {
                    let mut tuples = Vec::with_capacity(items.len());
                    for item in items {
                        let cells = item
                            .as_array()
                            .into_iter()
                            .flatten()
                            .map(Value::from_json)
                            .collect::<Result<Vec<_>, _>>()?;
                        tuples.push(cells);
                    }
                    Ok(Self::Tuples(tuples))
                } else {
                    Err(TableFrameError::UnsupportedShape(
                        "array elements must be all objects or all arrays".into(),
                    ))
                }
            }
            JsonValue::Object(map) => {
                let mut columns = Vec::with_capacity(map.len());
                for (name, values) in map {
                    let Some(values) = values.as_array() else {
                        return Err(TableFrameError::UnsupportedShape(alloc::format!(
                            "column {name} is not an array"
                        )));
                    };
                    let values = values
                        .iter()
                        .map(Value::from_json)
                        .collect::<Result<Vec<_>, _>>()?;
                    columns.push((name.clone(), values));
                }
                Ok(Self::Columns(columns))
            }
            other => Err(TableFrameError::UnsupportedShape(alloc::format!(
                "expected an array or an object, found {}",
                json_kind(other)
            ))),
        }
    }

    pub(crate) fn into_frame(self) -> Result<TableFrame, TableFrameError> {
        match self {
            Self::Frame(frame) => Ok(frame),
            Self::Records(rows) => records_to_frame(rows),
            Self::Columns(columns) => {
                let columns = columns
                    .into_iter()
                    .map(|(name, values)| Column::new(name, values))
                    .collect();
                TableFrame::from_columns(columns, 0)
            }
            Self::Tuples(rows) => tuples_to_frame(rows),
        }
    }
}

fn records_to_frame(rows: Vec<Row>) -> Result<TableFrame, TableFrameError> {
    let row_count = rows.len();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<(String, Vec<Value>)> = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        for (key, value) in row {
            let idx = match index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = columns.len();
                    index.insert(key.clone(), idx);
                    columns.push((key, vec![Value::Null; i]));
                    idx
                }
            };
            columns[idx].1.push(value);
        }
        for (_, values) in &mut columns {
            if values.len() == i {
                values.push(Value::Null);
            }
        }
    }
    let columns = columns
        .into_iter()
        .map(|(name, values)| Column::new(name, values))
        .collect();
    TableFrame::from_columns(columns, row_count)
}

fn tuples_to_frame(rows: Vec<Vec<Value>>) -> Result<TableFrame, TableFrameError> {
    let row_count = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    let mut columns: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(row_count)).collect();
    for (row, tuple) in rows.into_iter().enumerate() {
        if tuple.len() != width {
            return Err(TableFrameError::RaggedRow {
                row,
                expected: width,
                actual: tuple.len(),
            });
        }
        for (col, value) in columns.iter_mut().zip(tuple) {
            col.push(value);
        }
    }
    let columns = columns
        .into_iter()
        .enumerate()
        .map(|(i, values)| Column::new(i.to_string(), values))
        .collect();
    TableFrame::from_columns(columns, row_count)
}

#[cfg(feature = "json")]
fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value as JsonValue;

    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

impl From<TableFrame> for TableInput {
    fn from(frame: TableFrame) -> Self {
        Self::Frame(frame)
    }
}

impl From<&TableFrame> for TableInput {
    fn from(frame: &TableFrame) -> Self {
        Self::Frame(frame.clone())
    }
}

impl From<Vec<Row>> for TableInput {
    fn from(rows: Vec<Row>) -> Self {
        Self::Records(rows)
    }
}

impl<const N: usize> From<[Row; N]> for TableInput {
    fn from(rows: [Row; N]) -> Self {
        Self::Records(rows.into())
    }
}

impl From<Vec<(String, Vec<Value>)>> for TableInput {
    fn from(columns: Vec<(String, Vec<Value>)>) -> Self {
        Self::Columns(columns)
    }
}

impl From<Vec<Vec<Value>>> for TableInput {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        Self::Tuples(rows)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn records_union_keys_and_fill_nulls() {
        let frame = TableFrame::new([
            Row::from([("id", Value::Int(1))]),
            Row::from([("id", Value::Int(2)), ("extra", "x".into())]),
            Row::from([("extra", Value::from("y"))]),
        ])
        .unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["id", "extra"]);
        assert_eq!(
            frame.column("id").unwrap().values(),
            &[Value::Int(1), Value::Int(2), Value::Null]
        );
        assert_eq!(
            frame.column("extra").unwrap().values(),
            &[Value::Null, Value::from("x"), Value::from("y")]
        );
    }

    #[test]
    fn records_without_keys_still_count_rows() {
        let frame = TableFrame::from_records([Row::new(), Row::new()]).unwrap();
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.column_count(), 0);
    }

    #[test]
    fn columns_must_be_rectangular() {
        let err = TableFrame::new(TableInput::columns([
            ("a", vec![Value::Int(1), Value::Int(2)]),
            ("b", vec![Value::Int(1)]),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            TableFrameError::LengthMismatch {
                column: "b".into(),
                expected: 2,
                actual: 1,
            }
        );
        let err = TableFrame::new(TableInput::columns([
            ("a", vec![Value::Int(1)]),
            ("a", vec![Value::Int(2)]),
        ]))
        .unwrap_err();
        assert_eq!(err, TableFrameError::DuplicateColumn { name: "a".into() });
    }

    #[test]
    fn tuples_are_named_by_position() {
        let frame = TableFrame::new(TableInput::tuples([
            vec![Value::Int(1), "a".into()],
            vec![Value::Int(2), "b".into()],
        ]))
        .unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["0", "1"]);
        assert_eq!(frame.value(1, "1"), Some(&Value::from("b")));

        let err = TableFrame::new(TableInput::tuples([vec![1, 2], vec![3]])).unwrap_err();
        assert_eq!(
            err,
            TableFrameError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn existing_frames_are_copied() {
        let original = TableFrame::new(TableInput::columns([("a", vec![Value::Int(1)])])).unwrap();
        let copy = TableFrame::new(&original).unwrap();
        assert_eq!(copy, original);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_shapes_dispatch() {
        use serde_json::json;

        let records = TableInput::from_json(&json!([{"id": 1, "v": 2.5}, {"id": 2}])).unwrap();
        let frame = TableFrame::new(records).unwrap();
        assert_eq!(frame.value(0, "v"), Some(&Value::Float(2.5)));
        assert_eq!(frame.value(1, "v"), Some(&Value::Null));

        let columns = TableInput::from_json(&json!({"a": [1, 2], "b": ["x", "y"]})).unwrap();
        assert_eq!(TableFrame::new(columns).unwrap().row_count(), 2);

        let tuples = TableInput::from_json(&json!([[1, "x"], [2, "y"]])).unwrap();
        assert_eq!(TableFrame::new(tuples).unwrap().column_count(), 2);
    }

    #[cfg(feature = "preserve_order")]
    #[test]
    fn json_keys_keep_document_order() {
        use serde_json::json;

        let records = TableInput::from_json(&json!([{"id": 1, "name": "a", "age": 3}])).unwrap();
        let frame = TableFrame::new(records).unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["id", "name", "age"]);

        let columns = TableInput::from_json(&json!({"z": [1], "a": [2]})).unwrap();
        let frame = TableFrame::new(columns).unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_scalars_and_mixed_arrays_are_rejected() {
        use serde_json::json;

        for bad in [json!(42), json!("text"), json!([1, 2]), json!([{"a": 1}, [1]])] {
            assert!(
                matches!(
                    TableInput::from_json(&bad),
                    Err(TableFrameError::UnsupportedShape(_))
                ),
                "{bad} should be rejected"
            );
        }
        assert!(
            TableInput::from_json(&json!({"a": 1})).is_err(),
            "column values must be arrays"
        );
        assert!(
            TableInput::from_json(&json!([{"a": [1]}])).is_err(),
            "cells must be scalars"
        );
    }
}
