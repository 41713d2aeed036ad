use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaywatchError>;

/// Failures raised at the boundaries of the system. The filter and
/// aggregation core itself is total and never returns one of these.
#[derive(Error, Debug)]
pub enum PaywatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("event query failed: {0}")]
    Query(String),
    #[error("event query still running after {attempts} poll attempts")]
    QueryTimeout { attempts: u32 },
    #[error("event query cancelled")]
    Cancelled,
}
