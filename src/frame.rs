//! In-memory columnar table.
//!
//! A [`Frame`] is an ordered list of named [`Column`]s that all share one
//! row count. Each column owns a typed [`ColumnData`] buffer; the reducer
//! swaps that buffer for a narrower one through [`Frame::replace_column_data`]
//! or removes the column entirely. Column order is the output layout and is
//! never changed by a replacement.
//!
//! Missing values are represented per storage family: integral and boolean
//! storage holds none, float storage uses `NaN`, and text, category and
//! datetime storage use `None` cells.

use std::{collections::HashMap, mem};

use chrono::NaiveDateTime;
use half::f16;
use itertools::Itertools;

use crate::{
    dtype::{DType, Kind},
    error::ReduceError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Bool(Vec<bool>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Text(Vec<Option<String>>),
    Category(Categorical),
    DateTime(Vec<Option<NaiveDateTime>>),
}

/// Dictionary encoded text: each row stores an index into `categories`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Categorical {
    pub categories: Vec<String>,
    pub codes: Vec<Option<u32>>,
}

impl Categorical {
    /// Encodes text cells against their sorted distinct values.
    pub fn encode(cells: &[Option<String>]) -> Self {
        let categories = cells
            .iter()
            .flatten()
            .unique()
            .sorted()
            .cloned()
            .collect::<Vec<_>>();
        let lookup = categories
            .iter()
            .enumerate()
            .map(|(idx, value)| (value.as_str(), idx as u32))
            .collect::<HashMap<_, _>>();
        let codes = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(|value| lookup.get(value).copied()))
            .collect();
        Self { categories, codes }
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .and_then(|code| self.categories.get(code as usize))
            .map(String::as_str)
    }

    pub fn decode(&self) -> Vec<Option<String>> {
        (0..self.codes.len())
            .map(|row| self.get(row).map(str::to_string))
            .collect()
    }
}

macro_rules! integral_values {
    ($values:expr) => {
        $values.iter().map(|v| *v as i128).collect::<Vec<i128>>()
    };
}

macro_rules! narrow_integers {
    ($values:expr, $target:ty, $variant:ident, $column:expr, $dtype:expr) => {
        $values
            .iter()
            .map(|v| <$target>::try_from(*v))
            .collect::<Result<Vec<$target>, _>>()
            .map(ColumnData::$variant)
            .map_err(|_| ReduceError::CastOverflow {
                column: $column.to_string(),
                dtype: $dtype,
            })
    };
}

impl ColumnData {
    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Bool(_) => DType::Bool,
            ColumnData::UInt8(_) => DType::UInt8,
            ColumnData::UInt16(_) => DType::UInt16,
            ColumnData::UInt32(_) => DType::UInt32,
            ColumnData::UInt64(_) => DType::UInt64,
            ColumnData::Int8(_) => DType::Int8,
            ColumnData::Int16(_) => DType::Int16,
            ColumnData::Int32(_) => DType::Int32,
            ColumnData::Int64(_) => DType::Int64,
            ColumnData::Float16(_) => DType::Float16,
            ColumnData::Float32(_) => DType::Float32,
            ColumnData::Float64(_) => DType::Float64,
            ColumnData::Text(_) => DType::Text,
            ColumnData::Category(_) => DType::Category,
            ColumnData::DateTime(_) => DType::DateTime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Bool(v) => v.len(),
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float16(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Category(c) => c.codes.len(),
            ColumnData::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integral storage widened to `i128`, which holds every `u64` and `i64`.
    pub fn integers(&self) -> Option<Vec<i128>> {
        let values = match self {
            ColumnData::UInt8(v) => integral_values!(v),
            ColumnData::UInt16(v) => integral_values!(v),
            ColumnData::UInt32(v) => integral_values!(v),
            ColumnData::UInt64(v) => integral_values!(v),
            ColumnData::Int8(v) => integral_values!(v),
            ColumnData::Int16(v) => integral_values!(v),
            ColumnData::Int32(v) => integral_values!(v),
            ColumnData::Int64(v) => integral_values!(v),
            _ => return None,
        };
        Some(values)
    }

    /// Float storage widened to `f64`; missing cells stay `NaN`.
    pub fn floats(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Float16(v) => Some(v.iter().map(|x| x.to_f64()).collect()),
            ColumnData::Float32(v) => Some(v.iter().map(|x| f64::from(*x)).collect()),
            ColumnData::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnData::Text(cells) => Some(cells),
            _ => None,
        }
    }

    /// Bytes held by the column, including string payloads.
    pub fn memory_usage(&self) -> usize {
        match self {
            ColumnData::Text(cells) => {
                cells.len() * mem::size_of::<Option<String>>()
                    + cells.iter().flatten().map(String::len).sum::<usize>()
            }
            ColumnData::Category(cat) => {
                cat.codes.len() * mem::size_of::<Option<u32>>()
                    + cat.categories.len() * mem::size_of::<String>()
                    + cat.categories.iter().map(String::len).sum::<usize>()
            }
            ColumnData::DateTime(cells) => cells.len() * mem::size_of::<Option<NaiveDateTime>>(),
            other => {
                let width = other.dtype().width().unwrap_or_default();
                other.len() * width
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn kind(&self) -> Kind {
        self.dtype().kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Minimum and maximum over the non-missing values of a numeric column.
    pub fn observed_range(&self) -> Result<(f64, f64), ReduceError> {
        let range = if let Some(values) = self.data.integers() {
            values
                .iter()
                .copied()
                .minmax()
                .into_option()
                .map(|(min, max)| (min as f64, max as f64))
        } else if let Some(values) = self.data.floats() {
            values
                .into_iter()
                .filter(|v| !v.is_nan())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((min, max)) => Some((min.min(v), max.max(v))),
                })
        } else {
            return Err(ReduceError::NotNumeric {
                column: self.name.clone(),
                dtype: self.dtype(),
            });
        };
        range.ok_or_else(|| ReduceError::EmptyColumn {
            column: self.name.clone(),
        })
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        if let Some(values) = self.data.integers() {
            return values.into_iter().unique().count();
        }
        if let Some(values) = self.data.floats() {
            return values
                .into_iter()
                .filter(|v| !v.is_nan())
                .map(|v| if v == 0.0 { 0u64 } else { v.to_bits() })
                .unique()
                .count();
        }
        match &self.data {
            ColumnData::Bool(values) => values.iter().unique().count(),
            ColumnData::Text(cells) => cells.iter().flatten().unique().count(),
            ColumnData::Category(cat) => cat.codes.iter().flatten().unique().count(),
            ColumnData::DateTime(cells) => cells.iter().flatten().unique().count(),
            _ => 0,
        }
    }

    pub fn memory_usage(&self) -> usize {
        self.data.memory_usage()
    }

    /// Converts numeric storage into `target`, failing when a value does not
    /// fit. Casting to `Bool` requires at most two distinct values.
    pub fn cast(&self, target: DType) -> Result<ColumnData, ReduceError> {
        if target == self.dtype() {
            return Ok(self.data.clone());
        }
        if let Some(values) = self.data.integers() {
            return integers_to(&values, target, &self.name);
        }
        if let Some(values) = self.data.floats() {
            return match target {
                DType::Float16 => Ok(ColumnData::Float16(
                    values.iter().map(|v| f16::from_f64(*v)).collect(),
                )),
                DType::Float32 => Ok(ColumnData::Float32(
                    values.iter().map(|v| *v as f32).collect(),
                )),
                DType::Float64 => Ok(ColumnData::Float64(values)),
                _ => Err(self.unsupported(target)),
            };
        }
        match (&self.data, target) {
            (ColumnData::Text(cells), DType::Category) => {
                Ok(ColumnData::Category(Categorical::encode(cells)))
            }
            (ColumnData::Category(cat), DType::Text) => Ok(ColumnData::Text(cat.decode())),
            _ => Err(self.unsupported(target)),
        }
    }

    fn unsupported(&self, target: DType) -> ReduceError {
        ReduceError::UnsupportedCast {
            column: self.name.clone(),
            dtype: target,
        }
    }
}

/// Narrows widened integers into `target`.
pub fn integers_to(
    values: &[i128],
    target: DType,
    column: &str,
) -> Result<ColumnData, ReduceError> {
    match target {
        DType::UInt8 => narrow_integers!(values, u8, UInt8, column, target),
        DType::UInt16 => narrow_integers!(values, u16, UInt16, column, target),
        DType::UInt32 => narrow_integers!(values, u32, UInt32, column, target),
        DType::UInt64 => narrow_integers!(values, u64, UInt64, column, target),
        DType::Int8 => narrow_integers!(values, i8, Int8, column, target),
        DType::Int16 => narrow_integers!(values, i16, Int16, column, target),
        DType::Int32 => narrow_integers!(values, i32, Int32, column, target),
        DType::Int64 => narrow_integers!(values, i64, Int64, column, target),
        DType::Bool => collapse_to_bool(values, column),
        _ => Err(ReduceError::UnsupportedCast {
            column: column.to_string(),
            dtype: target,
        }),
    }
}

// {0, 1} keeps its natural meaning; any other pair maps its smaller value to false.
fn collapse_to_bool(values: &[i128], column: &str) -> Result<ColumnData, ReduceError> {
    let distinct = values.iter().copied().unique().sorted().collect::<Vec<_>>();
    let bools = match distinct.as_slice() {
        [] => Vec::new(),
        [lo, _] if !(*lo == 0 && distinct[1] == 1) => values.iter().map(|v| v != lo).collect(),
        [_] | [_, _] => values.iter().map(|v| *v != 0).collect(),
        _ => {
            return Err(ReduceError::CastOverflow {
                column: column.to_string(),
                dtype: DType::Bool,
            });
        }
    };
    Ok(ColumnData::Bool(bools))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self, ReduceError> {
        let mut frame = Self::new();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), ReduceError> {
        if self.column_index(&column.name).is_some() {
            return Err(ReduceError::DuplicateColumn(column.name));
        }
        let actual = column.len();
        if let Some(expected) = self.row_count()
            && expected != actual
        {
            return Err(ReduceError::LengthMismatch {
                column: column.name,
                expected,
                actual,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Row count shared by every column, `None` for a frame without columns.
    pub fn row_count(&self) -> Option<usize> {
        self.columns.first().map(Column::len)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn dtypes(&self) -> Vec<DType> {
        self.columns.iter().map(Column::dtype).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Swaps a column's storage in place, keeping its position.
    pub fn replace_column_data(
        &mut self,
        name: &str,
        data: ColumnData,
    ) -> Result<ColumnData, ReduceError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ReduceError::UnknownColumn(name.to_string()))?;
        let expected = self.columns[idx].len();
        if data.len() != expected {
            return Err(ReduceError::LengthMismatch {
                column: name.to_string(),
                expected,
                actual: data.len(),
            });
        }
        Ok(mem::replace(&mut self.columns[idx].data, data))
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.column_index(name)?;
        Some(self.columns.remove(idx))
    }

    pub fn memory_usage(&self) -> usize {
        self.columns.iter().map(Column::memory_usage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn observed_range_skips_missing_floats() {
        let column = Column::new("c", ColumnData::Float64(vec![1.0, f64::NAN, 7.0, 3.0]));
        assert_eq!(column.observed_range().unwrap(), (1.0, 7.0));

        let all_missing = Column::new("c", ColumnData::Float64(vec![f64::NAN]));
        assert!(matches!(
            all_missing.observed_range(),
            Err(ReduceError::EmptyColumn { .. })
        ));
    }

    #[test]
    fn observed_range_rejects_text() {
        let column = Column::new("t", ColumnData::Text(text(&["a"])));
        assert!(matches!(
            column.observed_range(),
            Err(ReduceError::NotNumeric { dtype: DType::Text, .. })
        ));
    }

    #[test]
    fn distinct_count_ignores_missing_cells() {
        let column = Column::new(
            "t",
            ColumnData::Text(vec![Some("x".into()), None, Some("x".into()), Some("y".into())]),
        );
        assert_eq!(column.distinct_count(), 2);

        let floats = Column::new("f", ColumnData::Float64(vec![0.0, -0.0, f64::NAN, 2.5]));
        assert_eq!(floats.distinct_count(), 2);
    }

    #[test]
    fn cast_narrows_integers_and_reports_overflow() {
        let column = Column::new("a", ColumnData::Int64(vec![1, 200, 255]));
        assert_eq!(
            column.cast(DType::UInt8).unwrap(),
            ColumnData::UInt8(vec![1, 200, 255])
        );
        assert!(matches!(
            column.cast(DType::Int8),
            Err(ReduceError::CastOverflow { dtype: DType::Int8, .. })
        ));
    }

    #[test]
    fn cast_to_bool_maps_smaller_value_to_false() {
        let column = Column::new("g", ColumnData::Int64(vec![-1, -2, -1]));
        assert_eq!(
            column.cast(DType::Bool).unwrap(),
            ColumnData::Bool(vec![true, false, true])
        );
        let flags = Column::new("f", ColumnData::Int64(vec![1, 0, 1]));
        assert_eq!(
            flags.cast(DType::Bool).unwrap(),
            ColumnData::Bool(vec![true, false, true])
        );
    }

    #[test]
    fn categorical_round_trips_text() {
        let cells = vec![Some("b".to_string()), None, Some("a".to_string()), Some("b".into())];
        let encoded = Categorical::encode(&cells);
        assert_eq!(encoded.categories, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(encoded.codes, vec![Some(1), None, Some(0), Some(1)]);
        assert_eq!(encoded.decode(), cells);
    }

    #[test]
    fn frame_rejects_mismatched_lengths_and_duplicates() {
        let mut frame = Frame::new();
        frame
            .push_column(Column::new("a", ColumnData::Int64(vec![1, 2])))
            .unwrap();
        assert!(matches!(
            frame.push_column(Column::new("b", ColumnData::Int64(vec![1]))),
            Err(ReduceError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            frame.push_column(Column::new("a", ColumnData::Int64(vec![3, 4]))),
            Err(ReduceError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn replace_and_remove_preserve_order() {
        let mut frame = Frame::from_columns(vec![
            Column::new("a", ColumnData::Int64(vec![1, 2])),
            Column::new("b", ColumnData::Int64(vec![3, 4])),
            Column::new("c", ColumnData::Int64(vec![5, 6])),
        ])
        .unwrap();
        let previous = frame
            .replace_column_data("b", ColumnData::UInt8(vec![3, 4]))
            .unwrap();
        assert_eq!(previous.dtype(), DType::Int64);
        assert!(frame.remove_column("a").is_some());
        assert_eq!(frame.names(), vec!["b", "c"]);
        assert_eq!(frame.dtypes(), vec![DType::UInt8, DType::Int64]);
        assert_eq!(frame.memory_usage(), 2 + 16);
    }
}
