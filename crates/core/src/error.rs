use thiserror::Error;

pub type Result<T> = std::result::Result<T, GiffosError>;

/// Every failure the search and copy flows can hit. None of them are fatal:
/// callers log and leave their state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GiffosError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("clipboard hand-off failed: {0}")]
    NativeHandoff(String),
}

impl From<std::io::Error> for GiffosError {
    fn from(error: std::io::Error) -> Self {
        GiffosError::Storage(error.to_string())
    }
}
