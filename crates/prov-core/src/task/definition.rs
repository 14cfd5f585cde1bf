use std::path::PathBuf;

use async_trait::async_trait;
use prov_domain::UserId;

use super::TaskReporter;
use crate::engine::CancellationSignal;
use crate::errors::CleanupError;
use crate::metrics::MetricsCategory;

/// Entrada que el runner entrega a cada paso.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub user_id: UserId,
    /// Último archivo de paquete publicado por un paso anterior (`None` si la
    /// descarga se omitió o aún no hubo descarga).
    pub package_location: Option<PathBuf>,
    /// Señal de cancelación del invocador. Es consultiva: el paso puede
    /// ignorarla.
    pub cancellation: CancellationSignal,
}

/// Paso del pipeline de aprovisionamiento.
#[async_trait]
pub trait ProvisioningTask: Send {
    /// Identificador estable y único dentro del pipeline.
    fn id(&self) -> &str;

    fn metrics_category(&self) -> MetricsCategory;

    /// Arranca el trabajo del paso. Puede retornar antes de reportar (por
    /// ejemplo tras encolar una descarga) siempre que el reporter quede en
    /// manos de quien terminará el trabajo.
    async fn run(&mut self, input: TaskInput, reporter: TaskReporter);

    /// Libera lo que `run` haya adquirido. Idempotente y seguro aunque `run`
    /// no haya terminado.
    async fn clean_up(&mut self) -> Result<(), CleanupError>;
}
