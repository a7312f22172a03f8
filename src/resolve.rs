//! Verdicts for text columns: datetime, boolean, category or drop.

use chrono::NaiveDateTime;
use log::debug;

use crate::{
    data::parse_temporal,
    error::ProbeError,
    frame::{Categorical, Column},
};

pub type ParsedTemporal = Vec<Option<NaiveDateTime>>;

/// Checks whether every present cell of a text column is a date or time.
pub trait DateTimeProbe {
    fn probe(&self, cells: &[Option<String>]) -> Result<ParsedTemporal, ProbeError>;
}

/// Probe backed by the chrono formats in [`crate::data`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoProbe;

impl DateTimeProbe for ChronoProbe {
    fn probe(&self, cells: &[Option<String>]) -> Result<ParsedTemporal, ProbeError> {
        if cells.iter().all(Option::is_none) {
            return Err(ProbeError::NoValues);
        }
        cells
            .iter()
            .map(|cell| match cell {
                Some(value) => parse_temporal(value)
                    .map(Some)
                    .map_err(|_| ProbeError::Unparseable(value.clone())),
                None => Ok(None),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    DateTime(ParsedTemporal),
    /// First-seen value maps to `false`, the second to `true`.
    Boolean(Vec<bool>),
    Category(Categorical),
    Drop,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::DateTime(_) => "datetime",
            Verdict::Boolean(_) => "boolean",
            Verdict::Category(_) => "category",
            Verdict::Drop => "drop",
        }
    }
}

/// Resolves a text column. Non-text columns resolve to `None`.
pub fn resolve_other(
    column: &Column,
    probe: &dyn DateTimeProbe,
    text_to_bool: bool,
) -> Option<Verdict> {
    let cells = column.data.text()?;

    match probe.probe(cells) {
        Ok(parsed) => return Some(Verdict::DateTime(parsed)),
        Err(err) => debug!("Column '{}' is not temporal: {err}", column.name),
    }

    let distinct = column.distinct_count();
    let rows = cells.len();

    if text_to_bool
        && distinct == 2
        && let Some(flags) = two_valued_flags(cells)
    {
        return Some(Verdict::Boolean(flags));
    }

    if distinct as f64 >= rows as f64 / 2.0 {
        Some(Verdict::Drop)
    } else {
        Some(Verdict::Category(Categorical::encode(cells)))
    }
}

// Boolean storage has no missing marker, so any empty cell keeps the column categorical.
fn two_valued_flags(cells: &[Option<String>]) -> Option<Vec<bool>> {
    let first = cells.first()?.as_deref()?;
    cells
        .iter()
        .map(|cell| cell.as_deref().map(|value| value != first))
        .collect()
}
