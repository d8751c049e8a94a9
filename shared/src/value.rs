//! Decimal value engine: parsing, clamping, snapping, stepping and display.
//!
//! Every function here is pure. Arithmetic is done on `Decimal` so repeated
//! stepping and bound comparisons never drift the way `f64` would.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::Constraints;

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increment => "increment",
            Direction::Decrement => "decrement",
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Parse user-entered text as a decimal.
///
/// Surrounding whitespace is ignored; scientific notation (`1.5e3`) is
/// accepted.
pub fn parse(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    // Decimal::from_str accepts digit separators ("1_000"), typed text may not
    if trimmed.is_empty() || trimmed.contains('_') {
        return Err(Error::invalid_number(text));
    }

    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(&trimmed.to_ascii_lowercase())
    } else {
        Decimal::from_str(trimmed)
    };

    parsed.map_err(|_| Error::invalid_number(text))
}

/// Convert a caller-side `f64` into a decimal.
///
/// Goes through the shortest round-trip text form, so `0.1` becomes exactly
/// `0.1` rather than its binary approximation.
pub fn from_native(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::invalid_number(value.to_string()));
    }
    let text = value.to_string();
    Decimal::from_str(&text).map_err(|_| Error::invalid_number(text))
}

/// Convert a decimal back into the caller's `f64` representation.
pub fn to_native(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

// ============================================================================
// Clamping and stepping
// ============================================================================

/// Constrain `value` to the configured bounds, snapping to the step grid when
/// enabled.
///
/// Bounds win over the grid: a value at or beyond a bound becomes that bound
/// exactly. Grid multiples are measured from zero.
pub fn clamp(value: Decimal, constraints: &Constraints) -> Decimal {
    if let Some(min) = constraints.min {
        if value <= min {
            return min;
        }
    }
    if let Some(max) = constraints.max {
        if value >= max {
            return max;
        }
    }
    if constraints.snap_to_step {
        snap(value, constraints)
    } else {
        value
    }
}

/// Move one step in `direction`.
///
/// On-grid values move by a whole step. Off-grid values move to the next grid
/// line in that direction instead, so 10.3 increments to 11 with step 1.
pub fn step(value: Decimal, direction: Direction, constraints: &Constraints) -> Decimal {
    let step = constraints.step;
    let next = if is_multiple(value, step) {
        match direction {
            Direction::Increment => value.checked_add(step),
            Direction::Decrement => value.checked_sub(step),
        }
    } else {
        match direction {
            Direction::Increment => round_to_step(value, step, RoundingStrategy::ToPositiveInfinity),
            Direction::Decrement => round_to_step(value, step, RoundingStrategy::ToNegativeInfinity),
        }
    };

    clamp(next.unwrap_or(value), constraints)
}

pub fn is_multiple(value: Decimal, step: Decimal) -> bool {
    value
        .checked_rem(step)
        .is_some_and(|remainder| remainder.is_zero())
}

fn round_to_step(value: Decimal, step: Decimal, strategy: RoundingStrategy) -> Option<Decimal> {
    value
        .checked_div(step)?
        .round_dp_with_strategy(0, strategy)
        .checked_mul(step)
}

fn snap(value: Decimal, constraints: &Constraints) -> Decimal {
    let step = constraints.step;
    let snapped = match round_to_step(value, step, RoundingStrategy::MidpointAwayFromZero) {
        Some(snapped) => snapped,
        None => return value,
    };

    // Rounding can cross a bound that the raw value sat inside of. Fall back
    // to the nearest in-bounds grid line, or the bound itself if the range
    // holds no grid line at all.
    if let Some(min) = constraints.min {
        if snapped < min {
            return match round_to_step(min, step, RoundingStrategy::ToPositiveInfinity) {
                Some(line) if constraints.max.map_or(true, |max| line <= max) => line,
                _ => min,
            };
        }
    }
    if let Some(max) = constraints.max {
        if snapped > max {
            return match round_to_step(max, step, RoundingStrategy::ToNegativeInfinity) {
                Some(line) if constraints.min.map_or(true, |min| line >= min) => line,
                _ => max,
            };
        }
    }
    snapped
}

// ============================================================================
// Display
// ============================================================================

/// Render `value` with the configured precision.
pub fn format(value: Decimal, constraints: &Constraints) -> String {
    let decimals = constraints.decimals;
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    // "-0.00" reads as a bug
    let rounded = if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    };

    if constraints.show_trailing_zeros {
        format!("{:.*}", decimals as usize, rounded)
    } else {
        rounded.normalize().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
