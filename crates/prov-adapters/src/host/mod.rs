//! Capacidades del anfitrión consumidas por los pasos.
//!
//! Cada trait es deliberadamente estrecho; las implementaciones reales viven
//! fuera de este crate y `memory` provee fakes en memoria.

pub mod memory;
mod types;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use prov_core::Digester;
use prov_domain::{ProvisioningParams, UserId};
use thiserror::Error;
use tokio::sync::broadcast;

pub use types::{DownloadId, DownloadRequest, DownloadStatus, PackageInfo, ReceiverInfo, Signature, BIND_DEVICE_ADMIN};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("download subsystem rejected request: {0}")]
    DownloadRejected(String),
    #[error("settings write failed for {key}: {reason}")]
    SettingsWrite { key: String, reason: String },
    #[error("install failed: {0}")]
    Install(String),
    #[error("{action} failed: {reason}")]
    Action { action: String, reason: String },
}

/// Gestor de descargas asíncrono. Las finalizaciones se anuncian por un canal
/// broadcast con el id de la descarga; el estado se consulta con `query`.
#[async_trait]
pub trait DownloadManager: Send + Sync {
    async fn enqueue(&self, request: DownloadRequest) -> Result<DownloadId, HostError>;
    /// Suscripción a notificaciones de finalización (puede haber duplicados).
    fn completions(&self) -> broadcast::Receiver<DownloadId>;
    fn query(&self, id: DownloadId) -> Option<DownloadStatus>;
    /// Elimina la entrada y su archivo. Devuelve cuántas entradas se borraron.
    fn remove(&self, id: DownloadId) -> usize;
}

pub trait PackageManager: Send + Sync {
    /// Versión instalada del paquete, si lo está.
    fn installed_version(&self, package: &str) -> Option<u64>;
    /// Metadatos de un archivo de paquete (firmas y receptores incluidos).
    fn archive_info(&self, path: &Path) -> Option<PackageInfo>;
}

pub trait ConnectivityProbe: Send + Sync {
    fn is_connected(&self) -> bool;
}

pub trait SecureSettings: Send + Sync {
    fn put_int(&self, key: &str, value: i64) -> Result<(), HostError>;
    fn get_int(&self, key: &str) -> Option<i64>;
}

#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(&self, archive: &Path, user_id: UserId) -> Result<(), HostError>;
}

/// Llamada opaca al ciclo de vida de usuarios/perfiles del anfitrión.
#[async_trait]
pub trait HostAction: Send + Sync {
    fn name(&self) -> &str;
    async fn perform(&self, params: &ProvisioningParams, user_id: UserId) -> Result<(), HostError>;
}

/// Acciones terminales disponibles para el pipeline.
#[derive(Clone)]
pub struct HostActions {
    pub create_profile: Arc<dyn HostAction>,
    pub set_device_owner: Arc<dyn HostAction>,
    pub set_profile_owner: Arc<dyn HostAction>,
}

/// Conjunto de capacidades que recibe la factoría de pasos.
#[derive(Clone)]
pub struct HostServices {
    pub downloads: Arc<dyn DownloadManager>,
    pub packages: Arc<dyn PackageManager>,
    pub connectivity: Arc<dyn ConnectivityProbe>,
    pub settings: Arc<dyn SecureSettings>,
    pub installer: Arc<dyn PackageInstaller>,
    pub digester: Arc<dyn Digester>,
    pub actions: HostActions,
}
