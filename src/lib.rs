//! provflow: ejecuta una solicitud de aprovisionamiento de punta a punta.
//!
//! Une la factoría de pasos (`prov-adapters`) con el runner (`prov-core`).
//! `demo` prepara un anfitrión en memoria capaz de servir la descarga.
pub mod demo;

use std::time::Duration;

use log::{info, warn};
use prov_adapters::{build_provisioning_tasks, HostServices};
use prov_core::{CoreEngineError, MetricsCategory, PipelineEvent, PipelineResult, ProvisioningConfig,
                ProvisioningEngine};
use prov_domain::{DomainError, ProvisioningParams, UserId};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),
    #[error("engine: {0}")]
    Engine(#[from] CoreEngineError),
}

/// Resultado de una corrida con su bitácora y métricas.
#[derive(Debug, Clone)]
pub struct ProvisioningReport {
    pub result: PipelineResult,
    pub events: Vec<PipelineEvent>,
    pub metrics: Vec<(MetricsCategory, Duration)>,
}

/// Arma el engine para `params` sin ejecutarlo (útil para suscribirse a los
/// eventos o cancelar desde fuera).
pub fn prepare(params: &ProvisioningParams, host: &HostServices, config: &ProvisioningConfig) -> Result<ProvisioningEngine, ProvisionError> {
    let tasks = build_provisioning_tasks(params, host, config)?;
    let engine = ProvisioningEngine::new().add_tasks(tasks).build()?;
    Ok(engine)
}

pub async fn provision(params: &ProvisioningParams,
                       host: &HostServices,
                       config: &ProvisioningConfig,
                       user_id: UserId)
                       -> Result<ProvisioningReport, ProvisionError> {
    let mut engine = prepare(params, host, config)?;
    info!("provisioning {} for user {user_id} (run {})", params.infer_device_admin_package_name(), engine.run_id());
    let result = engine.run(user_id).await?;
    Ok(ProvisioningReport { result,
                            events: engine.events(),
                            metrics: engine.metrics().recorded() })
}

/// Entrega cada evento de progreso a `emit` hasta el evento terminal o el
/// cierre del canal. Un receptor rezagado pierde eventos y sigue leyendo.
pub async fn forward_progress<F>(mut progress: broadcast::Receiver<PipelineEvent>, mut emit: F)
    where F: FnMut(&PipelineEvent)
{
    loop {
        let event = match progress.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(missed)) => {
                warn!("progress consumer skipped {missed} events");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        emit(&event);
        if event.kind.is_terminal() {
            break;
        }
    }
}
