use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Calculation error: Division by zero encountered in {0}")]
    DivisionByZero(String),

    #[error("Invalid input for calculation: {0}")]
    InvalidInput(String),
}
