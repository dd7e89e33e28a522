//! Quiz error types.
//!
//! Generation failures are recoverable (the user may start again); contract
//! violations mean the caller drove the state machine out of order.

use thiserror::Error;

use crate::model::Phase;

/// The text-generation backend could not produce usable output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend call itself failed.
    #[error("text generation failed: {0:#}")]
    Backend(#[source] anyhow::Error),

    /// The backend answered, but with nothing but whitespace.
    #[error("text generation returned an empty response")]
    EmptyResponse,
}

/// Errors raised by the quiz state machine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// An operation was called in a phase where it is not valid.
    #[error("`{operation}` is not valid while the quiz is {phase}")]
    ContractViolation {
        operation: &'static str,
        phase: Phase,
    },
}

impl QuizError {
    pub(crate) fn contract(operation: &'static str, phase: Phase) -> Self {
        QuizError::ContractViolation { operation, phase }
    }
}
