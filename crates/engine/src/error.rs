//! Shared error types for the engine crate.

use thiserror::Error;

use exam_core::model::{AnswerError, PaperError, QuestionError};
use exam_core::scoring::ScoringError;
use exam_gateway::GatewayError;

use crate::session::SessionStatus;

/// Errors emitted by the session engine.
///
/// Timer expiry is not represented here: reaching zero is a forced terminal
/// transition, not a failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// An operation was invoked while the session status does not permit it.
    /// The operation is rejected without touching session state.
    #[error("{event} is not allowed while the session is {from:?}")]
    InvalidTransition {
        from: SessionStatus,
        event: &'static str,
    },

    /// The platform rejected the fullscreen request. Retryable; the session
    /// stays in its pre-request status with all captured answers intact.
    #[error("fullscreen permission denied by the platform")]
    PermissionDenied,

    #[error(transparent)]
    Paper(#[from] PaperError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
