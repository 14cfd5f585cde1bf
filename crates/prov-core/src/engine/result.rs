use serde::{Deserialize, Serialize};

use crate::task::TaskErrorKind;

/// Resultado terminal publicado al invocador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineResult {
    Completed,
    Failed {
        step_id: String,
        kind: TaskErrorKind,
        message: Option<String>,
    },
    Cancelled,
}

impl PipelineResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Paso y motivo del fallo, si lo hubo.
    pub fn failure(&self) -> Option<(&str, TaskErrorKind)> {
        match self {
            Self::Failed { step_id, kind, .. } => Some((step_id, *kind)),
            _ => None,
        }
    }
}
