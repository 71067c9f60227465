use thiserror::Error;

/// Top-level error type for process-wide concerns (configuration, startup).
#[derive(Error, Debug)]
pub enum HeirError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Failure classes surfaced at the request boundary.
///
/// Every crate-level error maps onto exactly one of these. "Not found" is
/// also used for records owned by another user, so the existence of other
/// users' cases is never confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    StoreFailure,
    CalculationFailure,
}

impl ErrorKind {
    /// HTTP-style status code for this failure class.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::StoreFailure | Self::CalculationFailure => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
