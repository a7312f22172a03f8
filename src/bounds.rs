//! Value envelope estimation.
//!
//! The envelope is the range a column's future data is assumed to stay
//! within: the observed minimum and maximum widened by a proportional
//! margin. Non-negative columns keep a lower bound of zero unless the sign
//! policy explicitly allows negative values.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{error::ReduceError, frame::Column};

pub const DEFAULT_MARGIN: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Margin {
    /// Envelope equals the observed range.
    Exact,
    /// Widen each bound by this fraction of its own magnitude.
    Proportional(f64),
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Proportional(DEFAULT_MARGIN)
    }
}

impl Margin {
    pub fn proportional(value: f64) -> Result<Self, ReduceError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Margin::Proportional(value))
        } else {
            Err(ReduceError::InvalidMargin(value))
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Margin::Exact => 0.0,
            Margin::Proportional(value) => value,
        }
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margin::Exact => write!(f, "exact"),
            Margin::Proportional(value) => write!(f, "{value}"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SignPolicy {
    /// Non-negative data is assumed to stay non-negative.
    #[default]
    Infer,
    /// Never clamp the lower bound to zero.
    AllowNegative,
    /// Clamp the lower bound to zero whenever the data is non-negative.
    NonNegative,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub lower: f64,
    pub upper: f64,
}

impl Envelope {
    pub fn is_unsigned(&self) -> bool {
        self.lower >= 0.0
    }

    pub fn within(&self, min: f64, max: f64) -> bool {
        self.lower > min && self.upper < max
    }
}

/// Widens an observed `(min, max)` pair according to the margin and sign policy.
pub fn widen(min: f64, max: f64, margin: Margin, sign_policy: SignPolicy) -> Envelope {
    let factor = margin.factor();
    let upper = max + max.abs() * factor;
    let low = min - min.abs() * factor;
    let clamp_to_zero = min >= 0.0 && sign_policy != SignPolicy::AllowNegative;
    let lower = if clamp_to_zero { low.max(0.0) } else { low };
    Envelope { lower, upper }
}

/// Envelope of a numeric column's non-missing values.
pub fn envelope(
    column: &Column,
    margin: Margin,
    sign_policy: SignPolicy,
) -> Result<Envelope, ReduceError> {
    let (min, max) = column.observed_range()?;
    Ok(widen(min, max, margin, sign_policy))
}
