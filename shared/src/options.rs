//! Caller-supplied configuration for a numeric input.
//!
//! Decimal fields travel as strings in JSON (`"step": "0.25"`) so that no
//! binary floating point ever touches the bounds or the step size.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_DELAY_MS: u32 = 250;
pub const DEFAULT_INTERVAL_MS: u32 = 75;

// ============================================================================
// Constraints
// ============================================================================

/// Bounds, granularity and display rules applied to every committed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constraints {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub step: Decimal,
    pub decimals: u32,
    pub snap_to_step: bool,
    pub show_trailing_zeros: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            step: Decimal::ONE,
            decimals: 0,
            snap_to_step: false,
            show_trailing_zeros: false,
        }
    }
}

impl Constraints {
    pub fn with_min(mut self, min: Decimal) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: Decimal) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: Decimal) -> Self {
        self.step = step;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn snap_to_step(mut self, enabled: bool) -> Self {
        self.snap_to_step = enabled;
        self
    }

    pub fn show_trailing_zeros(mut self, enabled: bool) -> Self {
        self.show_trailing_zeros = enabled;
        self
    }

    /// Normalize values the engine cannot work with.
    ///
    /// A step that is zero or negative falls back to 1; inverted bounds are
    /// swapped.
    pub fn validated(mut self) -> Self {
        if self.step <= Decimal::ZERO {
            log::warn!("step {} is not positive, using {}", self.step, Decimal::ONE);
            self.step = Decimal::ONE;
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                log::warn!("min {} is greater than max {}, swapping", min, max);
                self.min = Some(max);
                self.max = Some(min);
            }
        }
        self
    }
}

// ============================================================================
// Repeat timing
// ============================================================================

/// Press-and-hold timing: one step immediately, another after `delay_ms`,
/// then one every `interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepeatTiming {
    pub delay_ms: u32,
    pub interval_ms: u32,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

// ============================================================================
// Spinner options
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpinnerOptions {
    #[serde(flatten)]
    pub constraints: Constraints,
    pub timing: RepeatTiming,
    pub disabled: bool,
}

impl SpinnerOptions {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            ..Self::default()
        }
    }

    pub fn with_timing(mut self, timing: RepeatTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Decode options from JSON and normalize them.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.validated())
    }

    pub fn validated(mut self) -> Self {
        self.constraints = self.constraints.validated();
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
