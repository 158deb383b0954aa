use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YtmError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Numerical fault in {context}")]
    NumericalFault { context: String },

    #[error("Convergence failure: yield solve did not converge after {iterations} iterations (last estimate: {last_estimate})")]
    ConvergenceFailure {
        iterations: u32,
        last_estimate: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for YtmError {
    fn from(e: serde_json::Error) -> Self {
        YtmError::SerializationError(e.to_string())
    }
}
