use thiserror::Error;

use crate::filter::FilterError;

/// Errors from calls to the hosted platform
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// The platform answered and refused the request; `message` is its own text
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Refusing to write to '{0}' without a row filter")]
    UnfilteredWrite(String),

    #[error("Invalid backend configuration: {0}")]
    Config(String),

    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl BackendError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => BackendError::Unauthorized(message),
            404 => BackendError::NotFound(message),
            _ => BackendError::Rejected { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(BackendError::from_status(401, "JWT expired".into()).is_unauthorized());
        assert!(matches!(BackendError::from_status(404, "x".into()), BackendError::NotFound(_)));

        let err = BackendError::from_status(400, "Invalid login credentials".into());
        assert!(matches!(err, BackendError::Rejected { status: 400, .. }));
        assert_eq!(err.to_string(), "Invalid login credentials");
    }
}
