//! Tipos de evento del pipeline y estructura `PipelineEvent`.
//!
//! El runner emite un evento por cada transición observable. Los eventos de
//! paso son informativos (progreso); el evento terminal (`PipelineCompleted`,
//! `PipelineFailed` o `PipelineCancelled`) es siempre el último de una
//! ejecución.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use prov_domain::UserId;
use uuid::Uuid;

use crate::task::TaskErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de una ejecución.
    PipelineStarted { step_count: usize, user_id: UserId },
    StepStarted { step_index: usize, step_id: String },
    StepSucceeded {
        step_index: usize,
        step_id: String,
        package_location: Option<String>,
        elapsed_ms: Option<u64>,
    },
    StepFailed {
        step_index: usize,
        step_id: String,
        kind: TaskErrorKind,
        message: Option<String>,
    },
    /// El invocador pidió cancelar. Se registra una sola vez.
    CancellationRequested { pending_step: Option<String> },
    /// `clean_up` invocado; `error` presente si falló (se ignora).
    CleanupPerformed { step_index: usize, step_id: String, error: Option<String> },
    PipelineCompleted,
    PipelineFailed { step_id: String, kind: TaskErrorKind },
    PipelineCancelled,
}

impl PipelineEventKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PipelineCompleted | Self::PipelineFailed { .. } | Self::PipelineCancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>,
}
