//! Errores específicos del core.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CoreEngineError {
    #[error("pipeline already ran")] AlreadyRan,
    #[error("pipeline has no steps")] EmptyPipeline,
    #[error("duplicate step id: {0}")] DuplicateStepId(String),
}

/// Fallo durante `clean_up`. El runner lo registra y continúa.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("cleanup of {step_id} failed: {reason}")]
pub struct CleanupError {
    pub step_id: String,
    pub reason: String,
}

impl CleanupError {
    pub fn new(step_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { step_id: step_id.into(),
               reason: reason.into() }
    }
}
