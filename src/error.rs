use thiserror::Error;

/// Failures surfaced by the simulation and alerting core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycloneError {
    /// Bad input from the caller; the request is rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// The classifier schema was not satisfied.
    #[error("validation error: missing features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    /// Data the operation depends on has not arrived yet.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A send to one subscriber or to the mail collaborator failed.
    #[error("delivery error: {0}")]
    Delivery(String),
}

impl CycloneError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingFeatures(_))
    }
}

pub type CycloneResult<T> = Result<T, CycloneError>;
