use thiserror::Error as ThisError;
use uniffi::Error;

#[derive(Debug, ThisError, Error)]
#[uniffi(flat_error)]
#[non_exhaustive]
pub enum LiftlogError {
    #[error("error: {0}")]
    Common(String),
    #[error("workout progress session is closed")]
    SessionClosed,
}

impl From<anyhow::Error> for LiftlogError {
    fn from(e: anyhow::Error) -> Self {
        LiftlogError::Common(format!("{:#}", e))
    }
}

impl From<String> for LiftlogError {
    fn from(s: String) -> Self {
        LiftlogError::Common(s)
    }
}

impl From<&str> for LiftlogError {
    fn from(s: &str) -> Self {
        LiftlogError::Common(s.to_string())
    }
}
