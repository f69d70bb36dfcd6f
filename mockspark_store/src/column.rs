// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named columns, boolean masks, and vectorized column expressions.
//!
//! These are the building blocks callers use inside filter predicates and derived-column
//! functions, e.g. `frame.column("age")?.gt(28)` or `frame.column("age")?.add(1)`.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::Not;

use crate::{TableFrameError, Value};

/// A named, ordered sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

/// One boolean per row, produced by column comparisons and consumed by filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask(Vec<bool>);

/// Right-hand side of a column expression: a broadcast scalar or another column.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// The same value for every row.
    Scalar(Value),
    /// Element-wise; must have the same length as the left-hand column.
    Column(&'a Column),
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    fn eval(self, a: &Value, b: &Value) -> Result<bool, TableFrameError> {
        match self {
            Self::Eq => return Ok(a.loose_eq(b)),
            Self::Ne => return Ok(!a.loose_eq(b)),
            _ => {}
        }
        if a.is_missing() || b.is_missing() {
            return Ok(false);
        }
        let Some(ord) = a.try_cmp(b) else {
            return Err(TableFrameError::TypeMismatch {
                op: self.symbol(),
                left: a.type_name(),
                right: b.type_name(),
            });
        };
        Ok(match self {
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Eq | Self::Ne => unreachable!("handled above"),
        })
    }
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    fn floats(self, a: f64, b: f64) -> Value {
        Value::Float(match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
        })
    }

    fn eval(self, a: &Value, b: &Value) -> Result<Value, TableFrameError> {
        let overflow = || TableFrameError::Overflow { op: self.symbol() };
        match (self, a, b) {
            (_, Value::Null, _) | (_, _, Value::Null) => Ok(Value::Null),
            (Self::Div, Value::Int(x), Value::Int(y)) => Ok(self.floats(*x as f64, *y as f64)),
            (Self::Add, Value::Int(x), Value::Int(y)) => {
                x.checked_add(*y).map(Value::Int).ok_or_else(overflow)
            }
            (Self::Sub, Value::Int(x), Value::Int(y)) => {
                x.checked_sub(*y).map(Value::Int).ok_or_else(overflow)
            }
            (Self::Mul, Value::Int(x), Value::Int(y)) => {
                x.checked_mul(*y).map(Value::Int).ok_or_else(overflow)
            }
            (_, Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => Ok(self.floats(x, y)),
                    _ => Ok(Value::Null),
                }
            }
            (Self::Add, Value::Str(x), Value::Str(y)) => {
                let mut out = String::with_capacity(x.len() + y.len());
                out.push_str(x);
                out.push_str(y);
                Ok(Value::Str(out))
            }
            (Self::Add, Value::Timestamp(t), Value::Int(us)) => {
                t.checked_add(*us).map(Value::Timestamp).ok_or_else(overflow)
            }
            (Self::Sub, Value::Timestamp(t), Value::Int(us)) => {
                t.checked_sub(*us).map(Value::Timestamp).ok_or_else(overflow)
            }
            (Self::Sub, Value::Timestamp(x), Value::Timestamp(y)) => {
                x.checked_sub(*y).map(Value::Int).ok_or_else(overflow)
            }
            _ => Err(TableFrameError::TypeMismatch {
                op: self.symbol(),
                left: a.type_name(),
                right: b.type_name(),
            }),
        }
    }
}

impl Column {
    /// Creates a column from a name and its values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the values in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the column and returns its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `row`.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn take(&self, rows: impl Iterator<Item = usize>) -> Self {
        Self {
            name: self.name.clone(),
            values: rows.map(|r| self.values[r].clone()).collect(),
        }
    }

    /// `self == rhs` element-wise. Missing values are never equal.
    pub fn equal<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Eq, rhs.into())
    }

    /// `self != rhs` element-wise. Missing values are never equal, so this is `true` for them.
    pub fn not_equal<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Ne, rhs.into())
    }

    /// `self > rhs` element-wise.
    pub fn gt<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Gt, rhs.into())
    }

    /// `self >= rhs` element-wise.
    pub fn gt_eq<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Ge, rhs.into())
    }

    /// `self < rhs` element-wise.
    pub fn lt<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Lt, rhs.into())
    }

    /// `self <= rhs` element-wise.
    pub fn lt_eq<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mask, TableFrameError> {
        self.compare(CmpOp::Le, rhs.into())
    }

    /// `true` where the value is `Null` or `NaN`.
    pub fn is_null(&self) -> Mask {
        Mask(self.values.iter().map(Value::is_missing).collect())
    }

    /// `true` where the value is neither `Null` nor `NaN`.
    pub fn is_not_null(&self) -> Mask {
        !self.is_null()
    }

    /// `self + rhs` element-wise. Strings concatenate; `Null` propagates.
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Self, TableFrameError> {
        self.arith(ArithOp::Add, rhs.into())
    }

    /// `self - rhs` element-wise.
    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Self, TableFrameError> {
        self.arith(ArithOp::Sub, rhs.into())
    }

    /// `self * rhs` element-wise.
    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Self, TableFrameError> {
        self.arith(ArithOp::Mul, rhs.into())
    }

    /// `self / rhs` element-wise. Always produces floats for numeric input.
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Self, TableFrameError> {
        self.arith(ArithOp::Div, rhs.into())
    }

    fn compare(&self, op: CmpOp, rhs: Operand<'_>) -> Result<Mask, TableFrameError> {
        let out = match rhs {
            Operand::Scalar(v) => self
                .values
                .iter()
                .map(|a| op.eval(a, &v))
                .collect::<Result<_, _>>()?,
            Operand::Column(other) => {
                self.check_len(other)?;
                self.values
                    .iter()
                    .zip(&other.values)
                    .map(|(a, b)| op.eval(a, b))
                    .collect::<Result<_, _>>()?
            }
        };
        Ok(Mask(out))
    }

    fn arith(&self, op: ArithOp, rhs: Operand<'_>) -> Result<Self, TableFrameError> {
        let values = match rhs {
            Operand::Scalar(v) => self
                .values
                .iter()
                .map(|a| op.eval(a, &v))
                .collect::<Result<_, _>>()?,
            Operand::Column(other) => {
                self.check_len(other)?;
                self.values
                    .iter()
                    .zip(&other.values)
                    .map(|(a, b)| op.eval(a, b))
                    .collect::<Result<_, _>>()?
            }
        };
        Ok(Self {
            name: self.name.clone(),
            values,
        })
    }

    fn check_len(&self, other: &Self) -> Result<(), TableFrameError> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(TableFrameError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            })
        }
    }
}

impl From<Column> for Vec<Value> {
    fn from(column: Column) -> Self {
        column.values
    }
}

impl Mask {
    /// Wraps a vector of booleans.
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the mask has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of `true` entries.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Returns the entries as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Element-wise logical and. Both masks must have the same length.
    pub fn and(&self, other: &Self) -> Result<Self, TableFrameError> {
        self.zip_with(other, |a, b| a && b)
    }

    /// Element-wise logical or. Both masks must have the same length.
    pub fn or(&self, other: &Self) -> Result<Self, TableFrameError> {
        self.zip_with(other, |a, b| a || b)
    }

    fn zip_with(
        &self,
        other: &Self,
        f: impl Fn(bool, bool) -> bool,
    ) -> Result<Self, TableFrameError> {
        if self.len() != other.len() {
            return Err(TableFrameError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Self(self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect()))
    }
}

impl Not for Mask {
    type Output = Self;

    fn not(mut self) -> Self {
        for b in &mut self.0 {
            *b = !*b;
        }
        self
    }
}

impl From<Vec<bool>> for Mask {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl From<Mask> for Vec<bool> {
    fn from(mask: Mask) -> Self {
        mask.0
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> From<&'a Column> for Operand<'a> {
    fn from(column: &'a Column) -> Self {
        Self::Column(column)
    }
}

impl From<Value> for Operand<'_> {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for Operand<'_> {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for Operand<'_> {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for Operand<'_> {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<&str> for Operand<'_> {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for Operand<'_> {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use pretty_assertions::assert_eq;

    use super::*;

    fn ages() -> Column {
        Column::new("age", vec![25.into(), 30.into(), Value::Null, 35.into()])
    }

    #[test]
    fn comparisons_skip_nulls() {
        let mask = ages().gt(28).unwrap();
        assert_eq!(mask.as_slice(), &[false, true, false, true]);
        let mask = ages().not_equal(30).unwrap();
        assert_eq!(mask.as_slice(), &[true, false, true, true]);
    }

    #[test]
    fn ordering_against_a_string_is_a_type_error() {
        let err = ages().lt("x").unwrap_err();
        assert_eq!(
            err,
            TableFrameError::TypeMismatch {
                op: "<",
                left: "int",
                right: "string",
            }
        );
    }

    #[test]
    fn arithmetic_keeps_ints_and_propagates_null() {
        let plus = ages().add(1).unwrap();
        assert_eq!(plus.name(), "age");
        assert_eq!(
            plus.values(),
            &[Value::Int(26), Value::Int(31), Value::Null, Value::Int(36)]
        );
        let halves = ages().div(2).unwrap();
        assert_eq!(halves.get(0), Some(&Value::Float(12.5)));
    }

    #[test]
    fn column_operands_must_align() {
        let short = Column::new("x", vec![1.into()]);
        assert_eq!(
            ages().add(&short).unwrap_err(),
            TableFrameError::ShapeMismatch {
                expected: 4,
                actual: 1,
            }
        );
        let doubled = ages().add(&ages()).unwrap();
        assert_eq!(doubled.get(3), Some(&Value::Int(70)));
    }

    #[test]
    fn strings_concatenate_and_overflow_is_reported() {
        let names = Column::new("name", vec!["Al".into()]);
        assert_eq!(names.add("ice").unwrap().get(0), Some(&Value::from("Alice")));
        let big = Column::new("n", vec![Value::Int(i64::MAX)]);
        assert_eq!(
            big.add(1).unwrap_err(),
            TableFrameError::Overflow { op: "+" }
        );
    }

    #[test]
    fn inclusive_comparisons_skip_nulls() {
        let col = Column::new("a", vec![Value::Int(1), Value::Int(3), Value::Null]);
        assert_eq!(col.gt_eq(3).unwrap().as_slice(), &[false, true, false]);
        assert_eq!(col.lt_eq(1).unwrap().as_slice(), &[true, false, false]);
        assert_eq!(col.gt_eq(Value::Float(1.0)).unwrap().count(), 2);
        assert_eq!(col.is_not_null().as_slice(), &[true, true, false]);
    }

    #[test]
    fn subtraction_propagates_null_and_checks_overflow() {
        let col = Column::new("a", vec![Value::Int(5), Value::Null, Value::Float(1.5)]);
        assert_eq!(
            col.sub(1).unwrap().values(),
            &[Value::Int(4), Value::Null, Value::Float(0.5)]
        );
        let small = Column::new("n", vec![Value::Int(i64::MIN)]);
        assert_eq!(small.sub(1).unwrap_err(), TableFrameError::Overflow { op: "-" });
    }

    #[test]
    fn timestamps_shift_by_micros_and_subtract_to_ints() {
        let at = Column::new("at", vec![Value::Timestamp(1_000), Value::Timestamp(5_000)]);
        assert_eq!(
            at.add(500).unwrap().values(),
            &[Value::Timestamp(1_500), Value::Timestamp(5_500)]
        );
        assert_eq!(
            at.sub(1_000).unwrap().values(),
            &[Value::Timestamp(0), Value::Timestamp(4_000)]
        );
        let start = Column::new("start", vec![Value::Timestamp(0), Value::Timestamp(2_000)]);
        assert_eq!(at.sub(&start).unwrap().values(), &[Value::Int(1_000), Value::Int(3_000)]);
        assert_eq!(
            at.add(&start).unwrap_err(),
            TableFrameError::TypeMismatch {
                op: "+",
                left: "timestamp",
                right: "timestamp",
            }
        );
        let late = Column::new("late", vec![Value::Timestamp(i64::MAX)]);
        assert_eq!(late.add(1).unwrap_err(), TableFrameError::Overflow { op: "+" });
    }

    #[test]
    fn masks_combine() {
        let a = Mask::new(vec![true, true, false]);
        let b = Mask::new(vec![true, false, false]);
        assert_eq!(a.and(&b).unwrap().as_slice(), &[true, false, false]);
        assert_eq!(a.or(&b).unwrap().count(), 2);
        assert_eq!((!a).as_slice(), &[false, false, true]);
        assert!(b.and(&Mask::new(vec![true])).is_err(), "length mismatch");
        assert_eq!(ages().is_null().count(), 1);
    }
}
