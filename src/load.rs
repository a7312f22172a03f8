//! CSV loading into a wide-typed [`Frame`].
//!
//! Columns are typed by scanning every cell: whole numbers become `int64`,
//! anything numeric becomes `float64` (missing cells are `NaN`), and the
//! rest stays `text`. A whole-number column with a missing cell is loaded as
//! `float64`, since integer storage has no missing marker.

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::is_missing_token,
    frame::{Column, ColumnData, Frame},
    io_utils,
};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub limit: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            limit: None,
        }
    }
}

pub fn read_frame(path: &Path, options: &LoadOptions) -> Result<Frame> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let input = io_utils::open_input(path)?;
    let options = LoadOptions {
        delimiter: Some(delimiter),
        ..*options
    };
    frame_from_reader(input, &options).with_context(|| format!("Loading {path:?}"))
}

pub fn frame_from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Frame> {
    let delimiter = options.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut reader = io_utils::open_csv_reader(reader, delimiter);
    let headers = io_utils::decode_record(reader.byte_headers()?, options.encoding)?;

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_idx, record) in reader.byte_records().enumerate() {
        if options.limit.is_some_and(|limit| row_idx >= limit) {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        for (column, value) in cells.iter_mut().zip(decoded) {
            column.push(value);
        }
    }

    let mut frame = Frame::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        let data = infer_column(&raw);
        debug!("Loaded column '{name}' as {}", data.dtype());
        frame
            .push_column(Column::new(name, data))
            .context("Assembling frame")?;
    }
    Ok(frame)
}

/// Types raw cells as `int64`, `float64` or `text`.
pub fn infer_column(raw: &[String]) -> ColumnData {
    let mut has_missing = false;
    let mut integers = Some(Vec::with_capacity(raw.len()));
    let mut floats = Some(Vec::with_capacity(raw.len()));

    for value in raw {
        if is_missing_token(value) {
            has_missing = true;
            integers = None;
            if let Some(f) = floats.as_mut() {
                f.push(f64::NAN);
            }
            continue;
        }
        let trimmed = value.trim();
        if let Some(ints) = integers.as_mut() {
            match trimmed.parse::<i64>() {
                Ok(parsed) => ints.push(parsed),
                Err(_) => integers = None,
            }
        }
        if let Some(f) = floats.as_mut() {
            match trimmed.parse::<f64>() {
                Ok(parsed) => f.push(parsed),
                Err(_) => floats = None,
            }
        }
        if integers.is_none() && floats.is_none() {
            break;
        }
    }

    let all_missing = raw.iter().all(|v| is_missing_token(v));
    match (integers, floats) {
        _ if all_missing && !raw.is_empty() => ColumnData::Text(vec![None; raw.len()]),
        (Some(ints), _) if !has_missing => ColumnData::Int64(ints),
        (_, Some(f)) => ColumnData::Float64(f),
        _ => ColumnData::Text(
            raw.iter()
                .map(|v| (!is_missing_token(v)).then(|| v.clone()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn whole_numbers_load_as_int64() {
        assert_eq!(
            infer_column(&raw(&["1", " 2", "-3"])),
            ColumnData::Int64(vec![1, 2, -3])
        );
    }

    #[test]
    fn missing_cells_promote_integers_to_float() {
        let data = infer_column(&raw(&["1", "", "3"]));
        let ColumnData::Float64(values) = data else {
            panic!("expected float64, got {data:?}");
        };
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
    }

    #[test]
    fn mixed_cells_stay_text() {
        assert_eq!(
            infer_column(&raw(&["x", "NA", "1"])),
            ColumnData::Text(vec![Some("x".into()), None, Some("1".into())])
        );
        assert_eq!(
            infer_column(&raw(&["", "n/a"])),
            ColumnData::Text(vec![None, None])
        );
    }

    #[test]
    fn frame_from_reader_honours_limit_and_delimiter() {
        let input = "id;price;label\n1;1.5;a\n2;2.5;b\n3;3.5;c\n";
        let options = LoadOptions {
            delimiter: Some(b';'),
            limit: Some(2),
            ..LoadOptions::default()
        };
        let frame = frame_from_reader(input.as_bytes(), &options).unwrap();
        assert_eq!(frame.names(), vec!["id", "price", "label"]);
        assert_eq!(frame.row_count(), Some(2));
        assert_eq!(
            frame.dtypes(),
            vec![
                crate::dtype::DType::Int64,
                crate::dtype::DType::Float64,
                crate::dtype::DType::Text
            ]
        );
    }
}
