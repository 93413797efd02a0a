use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Series '{series}' is not strictly increasing by date at {date}")]
    Unordered { series: String, date: NaiveDate },
}
