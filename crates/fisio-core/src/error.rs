use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time of day: {0}")]
    InvalidTime(String),

    #[error("date arithmetic overflowed from {0}")]
    DateOverflow(jiff::civil::Date),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("value out of range for {field}: {value} (expected {min}..={max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
}
