//! Text rendering of reduction results and YAML export of the reduced
//! column types.

use std::{fmt::Write as _, fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{dtype::DType, frame::Frame, reduce::ReduceReport};

pub fn report_rows(report: &ReduceReport) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["column", "before", "after", "action", "bytes_before", "bytes_after"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = report
        .columns
        .iter()
        .map(|outcome| {
            vec![
                outcome.name.clone(),
                outcome.before.to_string(),
                outcome
                    .after
                    .map(|dtype| dtype.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                outcome.action.to_string(),
                outcome.bytes_before.to_string(),
                outcome.bytes_after.to_string(),
            ]
        })
        .collect();
    (headers, rows)
}

pub fn frame_rows(frame: &Frame) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["column", "dtype", "distinct", "bytes"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = frame
        .columns()
        .iter()
        .map(|column| {
            vec![
                column.name.clone(),
                column.dtype().to_string(),
                column.distinct_count().to_string(),
                column.memory_usage().to_string(),
            ]
        })
        .collect();
    (headers, rows)
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header. Trailing padding is trimmed.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub dtype: DType,
}

/// Column names and storage types of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameSchema {
    pub columns: Vec<SchemaEntry>,
}

impl FrameSchema {
    pub fn of(frame: &Frame) -> Self {
        let columns = frame
            .columns()
            .iter()
            .map(|column| SchemaEntry {
                name: column.name.clone(),
                dtype: column.dtype(),
            })
            .collect();
        Self { columns }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Writing schema to {path:?}"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        serde_yaml::from_reader(file).with_context(|| format!("Parsing schema {path:?}"))
    }
}
