use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Motivo semántico de fallo de un paso.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskErrorKind {
    /// El subsistema de descargas reportó un estado no exitoso.
    #[error("download failed")]
    DownloadFailed,
    /// Precondición no cumplida (p.ej. sin conectividad). Reintentable.
    #[error("precondition failed")]
    Other,
    /// Archivo ilegible o sin receptor device-admin utilizable.
    #[error("device admin missing")]
    DeviceAdminMissing,
    /// La suma esperada no coincide. Fatal: nunca se instala un binario sin verificar.
    #[error("hash mismatch")]
    HashMismatch,
    #[error("install failed")]
    InstallFailed,
    #[error("host action failed")]
    HostActionFailed,
    /// El paso terminó sin reportar o falló de forma inesperada.
    #[error("internal error")]
    Internal,
}

impl TaskErrorKind {
    /// Código numérico por paso: descarga (`DownloadFailed = 0`, `Other = 1`),
    /// verificación (`HashMismatch = 0`, `DeviceAdminMissing = 1`), resto 0.
    pub fn code(&self) -> i32 {
        match self {
            Self::DownloadFailed | Self::HashMismatch => 0,
            Self::Other | Self::DeviceAdminMissing => 1,
            Self::InstallFailed | Self::HostActionFailed => 0,
            Self::Internal => -1,
        }
    }

    /// Fallos de red o de precondición: el invocador puede relanzar el pipeline.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Other | Self::DownloadFailed)
    }
}

/// Resultado terminal de una invocación de `run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Success {
        /// Archivo publicado para los pasos siguientes.
        package_location: Option<PathBuf>,
        /// Duración medida; `None` si el paso no detuvo su temporizador.
        elapsed: Option<Duration>,
    },
    Error { kind: TaskErrorKind, message: Option<String> },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
