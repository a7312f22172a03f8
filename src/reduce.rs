//! Column reducer.
//!
//! Walks a [`Frame`] in column order and rewrites every column into the
//! narrowest representation chosen by the selectors:
//!
//! - integral columns go through [`select_integer`];
//! - real columns go through [`narrow_float`], or are first rounded to
//!   integers when named in [`ReduceOptions::round_columns`];
//! - text columns are resolved into datetime, boolean, category or drop;
//! - bool, category and datetime columns are already compact and stay as
//!   they are, so reducing a reduced frame changes nothing.
//!
//! Rounding and datetime probing failures are local to their column. An
//! empty column aborts the whole pass before any column is rewritten.

use std::{collections::BTreeSet, fmt};

use log::debug;

use crate::{
    bounds::{Margin, SignPolicy},
    dtype::{DType, Kind},
    error::ReduceError,
    frame::{Column, ColumnData, Frame, integers_to},
    resolve::{ChronoProbe, DateTimeProbe, Verdict, resolve_other},
    select::{narrow_float, select_integer},
};

#[derive(Debug, Clone, Default)]
pub struct ReduceOptions {
    pub margin: Margin,
    pub sign_policy: SignPolicy,
    pub round_columns: BTreeSet<String>,
    pub allow_drop: bool,
    pub collapse_two_valued: bool,
    pub text_to_bool: bool,
}

impl ReduceOptions {
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_sign_policy(mut self, sign_policy: SignPolicy) -> Self {
        self.sign_policy = sign_policy;
        self
    }

    pub fn with_round_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.round_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allow_drop(mut self, allow_drop: bool) -> Self {
        self.allow_drop = allow_drop;
        self
    }

    pub fn with_collapse_two_valued(mut self, collapse: bool) -> Self {
        self.collapse_two_valued = collapse;
        self
    }

    pub fn with_text_to_bool(mut self, text_to_bool: bool) -> Self {
        self.text_to_bool = text_to_bool;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Numeric storage narrowed (or kept, when already narrowest).
    Cast,
    /// Real values rounded to integers, then narrowed.
    Rounded,
    /// Rounding was requested but failed; float selection applied instead.
    RoundingFallback,
    /// Text parsed into datetimes.
    Temporal,
    /// Text encoded as a category or boolean.
    Encoded,
    /// Too many distinct values; column removed.
    Dropped,
    /// Too many distinct values, but dropping was not allowed.
    Kept,
    /// Storage was already compact.
    Unchanged,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Cast => "cast",
            Action::Rounded => "rounded",
            Action::RoundingFallback => "rounding-fallback",
            Action::Temporal => "datetime",
            Action::Encoded => "encoded",
            Action::Dropped => "dropped",
            Action::Kept => "kept",
            Action::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutcome {
    pub name: String,
    pub before: DType,
    /// `None` when the column was dropped.
    pub after: Option<DType>,
    pub action: Action,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReduceReport {
    pub columns: Vec<ColumnOutcome>,
}

impl ReduceReport {
    pub fn bytes_before(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_before).sum()
    }

    pub fn bytes_after(&self) -> usize {
        self.columns.iter().map(|c| c.bytes_after).sum()
    }

    pub fn dropped(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.action == Action::Dropped)
            .map(|c| c.name.as_str())
    }

    pub fn outcome(&self, name: &str) -> Option<&ColumnOutcome> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Reduces `frame` in place using the default datetime probe.
pub fn reduce(frame: &mut Frame, options: &ReduceOptions) -> Result<ReduceReport, ReduceError> {
    reduce_with_probe(frame, options, &ChronoProbe)
}

/// Owned variant of [`reduce`] returning the same frame.
pub fn reduce_frame(mut frame: Frame, options: &ReduceOptions) -> Result<Frame, ReduceError> {
    reduce(&mut frame, options)?;
    Ok(frame)
}

pub fn reduce_with_probe(
    frame: &mut Frame,
    options: &ReduceOptions,
    probe: &dyn DateTimeProbe,
) -> Result<ReduceReport, ReduceError> {
    validate(frame, options)?;

    let names = frame
        .names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut report = ReduceReport::default();

    for name in names {
        let Some(column) = frame.column(&name) else {
            continue;
        };
        let before = column.dtype();
        let bytes_before = column.memory_usage();

        let (action, replacement) = plan_column(column, options, probe)?;

        let after = match (action, replacement) {
            (Action::Dropped, _) => {
                frame.remove_column(&name);
                None
            }
            (_, Some(data)) => {
                let dtype = data.dtype();
                frame.replace_column_data(&name, data)?;
                Some(dtype)
            }
            (_, None) => Some(before),
        };
        let bytes_after = frame.column(&name).map(Column::memory_usage).unwrap_or(0);

        debug!(
            "Column '{name}': {before} -> {} ({action})",
            after.map(|d| d.to_string()).unwrap_or_else(|| "dropped".into())
        );
        report.columns.push(ColumnOutcome {
            name,
            before,
            after,
            action,
            bytes_before,
            bytes_after,
        });
    }

    Ok(report)
}

fn validate(frame: &Frame, options: &ReduceOptions) -> Result<(), ReduceError> {
    if let Margin::Proportional(value) = options.margin {
        Margin::proportional(value)?;
    }
    for column in frame.columns() {
        if column.is_empty() {
            return Err(ReduceError::EmptyColumn {
                column: column.name.clone(),
            });
        }
        if column.kind() != Kind::Other {
            column.observed_range()?;
        }
    }
    Ok(())
}

fn plan_column(
    column: &Column,
    options: &ReduceOptions,
    probe: &dyn DateTimeProbe,
) -> Result<(Action, Option<ColumnData>), ReduceError> {
    match column.kind() {
        Kind::Integral => {
            let target = select_integer(
                column,
                options.margin,
                options.sign_policy,
                options.collapse_two_valued,
            )?;
            Ok((Action::Cast, Some(column.cast(target)?)))
        }
        Kind::Real if options.round_columns.contains(&column.name) => {
            match round_to_integers(column) {
                Ok(rounded) => {
                    let target = select_integer(
                        &rounded,
                        options.margin,
                        options.sign_policy,
                        options.collapse_two_valued,
                    )?;
                    Ok((Action::Rounded, Some(rounded.cast(target)?)))
                }
                Err(err) => {
                    debug!("{err}; keeping floating point storage");
                    let narrowed = narrow_float(column, options.margin, options.sign_policy)?;
                    Ok((Action::RoundingFallback, Some(narrowed)))
                }
            }
        }
        Kind::Real => {
            let narrowed = narrow_float(column, options.margin, options.sign_policy)?;
            Ok((Action::Cast, Some(narrowed)))
        }
        Kind::Other => Ok(match resolve_other(column, probe, options.text_to_bool) {
            None => (Action::Unchanged, None),
            Some(Verdict::Drop) if options.allow_drop => (Action::Dropped, None),
            Some(Verdict::Drop) => (Action::Kept, None),
            Some(Verdict::DateTime(parsed)) => {
                (Action::Temporal, Some(ColumnData::DateTime(parsed)))
            }
            Some(Verdict::Boolean(flags)) => (Action::Encoded, Some(ColumnData::Bool(flags))),
            Some(Verdict::Category(encoded)) => {
                (Action::Encoded, Some(ColumnData::Category(encoded)))
            }
        }),
    }
}

/// Rounds half to even and converts to 64-bit integers. Missing or
/// non-finite values and values beyond the `i64` range make rounding fail.
pub fn round_to_integers(column: &Column) -> Result<Column, ReduceError> {
    let failed = || ReduceError::RoundingFailed {
        column: column.name.clone(),
    };
    let values = column.data.floats().ok_or_else(failed)?;
    let rounded = values
        .iter()
        .map(|value| {
            let r = value.round_ties_even();
            if r.is_finite() && r >= i64::MIN as f64 && r < i64::MAX as f64 {
                Ok(r as i128)
            } else {
                Err(failed())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let data = integers_to(&rounded, DType::Int64, &column.name)?;
    Ok(Column::new(column.name.clone(), data))
}
