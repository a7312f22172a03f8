//! Narrowest-representation selection for numeric columns.

use crate::{
    bounds::{Envelope, Margin, SignPolicy, envelope},
    dtype::{
        DType, FLOAT16_LIMIT, FLOAT32_LIMIT, SIGNED_CANDIDATES, SIGNED_FALLBACK,
        UNSIGNED_CANDIDATES, UNSIGNED_FALLBACK,
    },
    error::ReduceError,
    frame::{Column, ColumnData},
};

const FLOAT_CANDIDATES: [(DType, f64); 2] = [
    (DType::Float16, FLOAT16_LIMIT),
    (DType::Float32, FLOAT32_LIMIT),
];

pub fn select_integer(
    column: &Column,
    margin: Margin,
    sign_policy: SignPolicy,
    collapse_two_valued: bool,
) -> Result<DType, ReduceError> {
    if collapse_two_valued && column.distinct_count() == 2 {
        return Ok(DType::Bool);
    }
    let envelope = envelope(column, margin, sign_policy)?;
    Ok(integer_for(&envelope))
}

/// First candidate whose range strictly contains the envelope.
pub fn integer_for(envelope: &Envelope) -> DType {
    if envelope.is_unsigned() {
        UNSIGNED_CANDIDATES
            .into_iter()
            .find(|candidate| fits(candidate, envelope, true))
            .unwrap_or(UNSIGNED_FALLBACK)
    } else {
        SIGNED_CANDIDATES
            .into_iter()
            .find(|candidate| fits(candidate, envelope, false))
            .unwrap_or(SIGNED_FALLBACK)
    }
}

fn fits(candidate: &DType, envelope: &Envelope, unsigned: bool) -> bool {
    let Some((min, max)) = candidate.integer_range() else {
        return false;
    };
    if unsigned {
        envelope.upper < max as f64
    } else {
        envelope.within(min as f64, max as f64)
    }
}

pub fn select_float(
    column: &Column,
    margin: Margin,
    sign_policy: SignPolicy,
) -> Result<DType, ReduceError> {
    narrow_float(column, margin, sign_policy).map(|data| data.dtype())
}

/// Casts a real column to its narrowest float width.
///
/// A width is accepted only when both the original values and the values
/// rounded to that width keep the envelope inside its limit. The stored
/// values are re-checked until they select their own width, so reducing
/// the result again leaves it unchanged.
pub fn narrow_float(
    column: &Column,
    margin: Margin,
    sign_policy: SignPolicy,
) -> Result<ColumnData, ReduceError> {
    let mut target = float_step(column, margin, sign_policy)?;
    let mut narrowed = Column::new(column.name.clone(), column.cast(target)?);
    loop {
        let next = float_step(&narrowed, margin, sign_policy)?;
        if next == target {
            return Ok(narrowed.data);
        }
        target = next;
        narrowed = Column::new(column.name.clone(), narrowed.cast(target)?);
    }
}

fn float_step(
    column: &Column,
    margin: Margin,
    sign_policy: SignPolicy,
) -> Result<DType, ReduceError> {
    let observed = envelope(column, margin, sign_policy)?;
    for (candidate, limit) in FLOAT_CANDIDATES {
        if !observed.within(-limit, limit) {
            continue;
        }
        let cast = Column::new(column.name.clone(), column.cast(candidate)?);
        if envelope(&cast, margin, sign_policy)?.within(-limit, limit) {
            return Ok(candidate);
        }
    }
    Ok(DType::Float64)
}
