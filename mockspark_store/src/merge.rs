// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relational merge of two frames.
//!
//! Row order is deterministic:
//! - `Inner` and `Left` follow the left frame; each left row emits its matches in right order.
//! - `Right` follows the right frame; each right row emits its matches in left order.
//! - `Outer` is the `Left` result followed by the unmatched right rows in right order.
//!
//! Output columns are the left columns (keys stay in place) followed by the right non-key
//! columns. Non-key names present on both sides get [`MergeOptions::suffixes`].

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::{Column, TableFrame, TableFrameError, Value};

/// Which unmatched rows a merge keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Only rows with a match on both sides.
    #[default]
    Inner,
    /// Every left row; right columns are `Null` where unmatched.
    Left,
    /// Every right row; left columns are `Null` where unmatched.
    Right,
    /// Every row from both sides.
    Outer,
}

/// The key columns of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JoinOn {
    /// Match on every column name the two frames share, in left column order.
    #[default]
    Natural,
    /// Match on these columns, which must exist on both sides. An empty list is rejected
    /// rather than treated as a cross join.
    Columns(SmallVec<[String; 2]>),
}

/// Tunables for [`TableFrame::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Appended to overlapping non-key column names from the left and right side.
    pub suffixes: (String, String),
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            suffixes: ("_x".into(), "_y".into()),
        }
    }
}

/// Hashable identity of a key cell. Integral floats collapse onto `Int` so `1` matches `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyAtom<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(&'a str),
    Timestamp(i64),
}

type RowKey<'a> = SmallVec<[KeyAtom<'a>; 2]>;
type RowIds = SmallVec<[usize; 1]>;

impl<'a> KeyAtom<'a> {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "the cast only happens after checking the float is integral and in range"
    )]
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => {
                let f = *f;
                if f.is_nan() {
                    Self::Null
                } else if f >= i64::MIN as f64 && f < i64::MAX as f64 && (f as i64) as f64 == f {
                    Self::Int(f as i64)
                } else {
                    Self::Float(f.to_bits())
                }
            }
            Value::Str(s) => Self::Str(s),
            Value::Timestamp(t) => Self::Timestamp(*t),
        }
    }
}

fn row_key<'a>(frame: &'a TableFrame, keys: &[usize], row: usize) -> RowKey<'a> {
    keys.iter()
        .map(|&c| KeyAtom::of(&frame.columns()[c].values()[row]))
        .collect()
}

fn index_rows<'a>(frame: &'a TableFrame, keys: &[usize]) -> HashMap<RowKey<'a>, RowIds> {
    let mut index: HashMap<RowKey<'a>, RowIds> = HashMap::new();
    for row in 0..frame.row_count() {
        index.entry(row_key(frame, keys, row)).or_default().push(row);
    }
    index
}

fn resolve(frame: &TableFrame, keys: &[String]) -> Result<SmallVec<[usize; 2]>, TableFrameError> {
    keys.iter()
        .map(|k| {
            frame
                .column_index(k)
                .ok_or_else(|| TableFrameError::ColumnNotFound { name: k.clone() })
        })
        .collect()
}

/// Returns `true` if `other` has a non-key column called `name`.
fn overlaps(name: &str, other: &TableFrame, other_keys: &[usize]) -> bool {
    other
        .column_index(name)
        .is_some_and(|c| !other_keys.contains(&c))
}

impl TableFrame {
    /// Merges `right` into this frame.
    ///
    /// `NaN` and `Null` key cells match each other.
    pub fn merge(
        &self,
        right: &Self,
        on: &JoinOn,
        how: JoinKind,
        options: &MergeOptions,
    ) -> Result<Self, TableFrameError> {
        let keys: SmallVec<[String; 2]> = match on {
            JoinOn::Columns(keys) => keys.clone(),
            JoinOn::Natural => self
                .column_names()
                .filter(|n| right.contains_column(n))
                .map(String::from)
                .collect(),
        };
        if keys.is_empty() {
            return Err(TableFrameError::NoCommonColumns);
        }
        let left_keys = resolve(self, &keys)?;
        let right_keys = resolve(right, &keys)?;

        let mut pairs: Vec<(Option<usize>, Option<usize>)> = Vec::new();
        match how {
            JoinKind::Inner | JoinKind::Left | JoinKind::Outer => {
                let index = index_rows(right, &right_keys);
                let mut matched = vec![false; right.row_count()];
                for l in 0..self.row_count() {
                    match index.get(&row_key(self, &left_keys, l)) {
                        Some(rows) => {
                            for &r in rows {
                                matched[r] = true;
                                pairs.push((Some(l), Some(r)));
                            }
                        }
                        None if how != JoinKind::Inner => pairs.push((Some(l), None)),
                        None => {}
                    }
                }
                if how == JoinKind::Outer {
                    pairs.extend(
                        matched
                            .iter()
                            .enumerate()
                            .filter(|(_, m)| !**m)
                            .map(|(r, _)| (None, Some(r))),
                    );
                }
            }
            JoinKind::Right => {
                let index = index_rows(self, &left_keys);
                for r in 0..right.row_count() {
                    match index.get(&row_key(right, &right_keys, r)) {
                        Some(rows) => pairs.extend(rows.iter().map(|&l| (Some(l), Some(r)))),
                        None => pairs.push((None, Some(r))),
                    }
                }
            }
        }
        tracing::trace!(keys = ?keys, how = ?how, rows = pairs.len(), "merged frames");

        let mut columns = Vec::with_capacity(self.column_count() + right.column_count());
        for (c, col) in self.columns().iter().enumerate() {
            let values = match left_keys.iter().position(|&k| k == c) {
                Some(k) => {
                    let right_col = &right.columns()[right_keys[k]];
                    pairs
                        .iter()
                        .map(|&(l, r)| match (l, r) {
                            (Some(l), _) => col.values()[l].clone(),
                            (None, Some(r)) => right_col.values()[r].clone(),
                            (None, None) => Value::Null,
                        })
                        .collect()
                }
                None => pairs
                    .iter()
                    .map(|&(l, _)| l.map_or(Value::Null, |l| col.values()[l].clone()))
                    .collect(),
            };
            let mut name = String::from(col.name());
            if !left_keys.contains(&c) && overlaps(col.name(), right, &right_keys) {
                name.push_str(&options.suffixes.0);
            }
            columns.push(Column::new(name, values));
        }
        for (c, col) in right.columns().iter().enumerate() {
            if right_keys.contains(&c) {
                continue;
            }
            let values = pairs
                .iter()
                .map(|&(_, r)| r.map_or(Value::Null, |r| col.values()[r].clone()))
                .collect();
            let mut name = String::from(col.name());
            if overlaps(col.name(), self, &left_keys) {
                name.push_str(&options.suffixes.1);
            }
            columns.push(Column::new(name, values));
        }
        Self::from_columns(columns, pairs.len())
    }
}

impl From<&str> for JoinOn {
    fn from(column: &str) -> Self {
        Self::Columns(smallvec::smallvec![column.into()])
    }
}

impl From<String> for JoinOn {
    fn from(column: String) -> Self {
        Self::Columns(smallvec::smallvec![column])
    }
}

impl From<&[&str]> for JoinOn {
    fn from(columns: &[&str]) -> Self {
        Self::Columns(columns.iter().map(|&c| c.into()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for JoinOn {
    fn from(columns: [&str; N]) -> Self {
        Self::Columns(columns.iter().map(|&c| c.into()).collect())
    }
}

impl From<Vec<String>> for JoinOn {
    fn from(columns: Vec<String>) -> Self {
        Self::Columns(columns.into_iter().collect())
    }
}

impl From<Option<&str>> for JoinOn {
    fn from(column: Option<&str>) -> Self {
        column.map_or(Self::Natural, Into::into)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Row, TableInput};

    fn frame(columns: &[(&str, Vec<Value>)]) -> TableFrame {
        TableFrame::new(TableInput::columns(columns.iter().cloned())).unwrap()
    }

    fn left() -> TableFrame {
        frame(&[
            ("id", vec![1.into(), 2.into(), 3.into()]),
            ("value", vec![10.into(), 20.into(), 30.into()]),
        ])
    }

    fn right() -> TableFrame {
        frame(&[
            ("id", vec![2.into(), 1.into(), 4.into(), 1.into()]),
            ("extra", vec!["B".into(), "A".into(), "D".into(), "A2".into()]),
        ])
    }

    fn column(frame: &TableFrame, name: &str) -> Vec<Value> {
        frame.column(name).unwrap().values().to_vec()
    }

    fn merge(how: JoinKind) -> TableFrame {
        left()
            .merge(&right(), &"id".into(), how, &MergeOptions::default())
            .unwrap()
    }

    #[test]
    fn inner_follows_left_order() {
        let out = merge(JoinKind::Inner);
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["id", "value", "extra"]);
        assert_eq!(column(&out, "id"), vec![1.into(), 1.into(), 2.into()]);
        assert_eq!(column(&out, "extra"), vec!["A".into(), "A2".into(), "B".into()]);
    }

    #[test]
    fn left_keeps_unmatched_left_rows() {
        let out = merge(JoinKind::Left);
        assert_eq!(column(&out, "id"), vec![1.into(), 1.into(), 2.into(), 3.into()]);
        assert_eq!(out.value(3, "extra"), Some(&Value::Null));
    }

    #[test]
    fn right_follows_right_order() {
        let out = merge(JoinKind::Right);
        assert_eq!(column(&out, "id"), vec![2.into(), 1.into(), 4.into(), 1.into()]);
        assert_eq!(
            column(&out, "value"),
            vec![20.into(), 10.into(), Value::Null, 10.into()]
        );
    }

    #[test]
    fn outer_appends_unmatched_right_rows() {
        let out = merge(JoinKind::Outer);
        assert_eq!(
            column(&out, "id"),
            vec![1.into(), 1.into(), 2.into(), 3.into(), 4.into()]
        );
        assert_eq!(out.value(4, "value"), Some(&Value::Null));
        assert_eq!(out.value(4, "extra"), Some(&Value::from("D")));
    }

    #[test]
    fn overlapping_columns_get_suffixes() {
        let a = frame(&[("k", vec![1.into()]), ("v", vec!["a".into()])]);
        let b = frame(&[("k", vec![1.into()]), ("v", vec!["b".into()])]);
        let out = a
            .merge(&b, &"k".into(), JoinKind::Inner, &MergeOptions::default())
            .unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["k", "v_x", "v_y"]);

        let options = MergeOptions {
            suffixes: ("_left".into(), "_right".into()),
        };
        let out = a.merge(&b, &"k".into(), JoinKind::Inner, &options).unwrap();
        assert_eq!(
            out.to_records(),
            vec![Row::from([
                ("k", Value::Int(1)),
                ("v_left", "a".into()),
                ("v_right", "b".into()),
            ])]
        );
    }

    #[test]
    fn natural_merge_uses_common_columns() {
        let out = left()
            .merge(&right(), &JoinOn::Natural, JoinKind::Inner, &MergeOptions::default())
            .unwrap();
        assert_eq!(out, merge(JoinKind::Inner));

        let disjoint = frame(&[("other", vec![1.into()])]);
        assert_eq!(
            left()
                .merge(&disjoint, &JoinOn::Natural, JoinKind::Inner, &MergeOptions::default())
                .unwrap_err(),
            TableFrameError::NoCommonColumns
        );
    }

    #[test]
    fn empty_key_list_is_not_a_cross_join() {
        let on = JoinOn::from(Vec::<String>::new());
        assert_eq!(on, JoinOn::Columns(SmallVec::new()));
        for how in [JoinKind::Inner, JoinKind::Outer] {
            assert_eq!(
                left()
                    .merge(&right(), &on, how, &MergeOptions::default())
                    .unwrap_err(),
                TableFrameError::NoCommonColumns
            );
        }
    }

    #[test]
    fn keys_match_across_int_and_float_and_must_exist() {
        let floats = frame(&[("id", vec![Value::Float(2.0)]), ("f", vec![true.into()])]);
        let out = left()
            .merge(&floats, &"id".into(), JoinKind::Inner, &MergeOptions::default())
            .unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.value(0, "value"), Some(&Value::Int(20)));

        let err = left()
            .merge(&floats, &["id", "f"].into(), JoinKind::Inner, &MergeOptions::default())
            .unwrap_err();
        assert_eq!(err, TableFrameError::ColumnNotFound { name: "f".into() });
    }
}
