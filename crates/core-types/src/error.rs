use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid symbol '{0}': identifier is empty after trimming")]
    InvalidSymbol(String),

    #[error("Malformed bar #{index} ({date}): {reason}")]
    MalformedBar {
        index: usize,
        date: NaiveDate,
        reason: String,
    },
}
