use thiserror::Error;

/// Errors produced by the numeric input logic.
///
/// `InvalidNumber` is the only condition the widget itself can hit, and it is
/// always recovered locally by keeping the last committed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid number: {input:?}")]
    InvalidNumber { input: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub(crate) fn invalid_number(input: impl Into<String>) -> Self {
        Self::InvalidNumber {
            input: input.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
