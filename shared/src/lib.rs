//! Platform-independent core of the numeric spinner input.

pub mod error;
pub mod options;
pub mod repeat;
pub mod spinner;
pub mod value;

pub use error::{Error, Result};
pub use options::{Constraints, RepeatTiming, SpinnerOptions};
pub use repeat::{RepeatController, RepeatEffect, RepeatState};
pub use rust_decimal::Decimal;
pub use spinner::{Command, GestureSource, Key, Msg, Spinner};
pub use value::Direction;
