use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use prov_core::{CancellationSignal, CleanupError, MetricsCategory, ProvisioningConfig, ProvisioningTask, TaskErrorKind,
                TaskInput, TaskReporter};
use prov_domain::PackageDownloadInfo;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::host::{DownloadId, DownloadManager, DownloadRequest, DownloadStatus, HostServices};
use crate::probes::{is_connected_to_network, package_requires_update};

/// Ajuste seguro que marca que el DPC fue descargado (nunca se limpia).
pub const DPC_DOWNLOADED: &str = "managed_provisioning_dpc_downloaded";

const ID: &str = "download_package";

/// Descarga el paquete del administrador si falta o está desactualizado.
///
/// `run` retorna tras encolar la descarga; el reporter queda en manos de un
/// listener que espera la notificación de finalización de *esta* descarga.
pub struct DownloadPackageTask {
    host: HostServices,
    package_name: String,
    info: PackageDownloadInfo,
    destination: PathBuf,
    debug: bool,
    download_id: Option<DownloadId>,
    listener: Option<JoinHandle<()>>,
}

impl DownloadPackageTask {
    pub fn new(host: HostServices, package_name: impl Into<String>, info: PackageDownloadInfo, config: &ProvisioningConfig) -> Self {
        Self { host,
               package_name: package_name.into(),
               info,
               destination: config.download_destination(),
               debug: config.debug,
               download_id: None,
               listener: None }
    }
}

#[async_trait]
impl ProvisioningTask for DownloadPackageTask {
    fn id(&self) -> &str {
        ID
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::DownloadPackageTaskMs
    }

    async fn run(&mut self, input: TaskInput, reporter: TaskReporter) {
        if !package_requires_update(self.host.packages.as_ref(), &self.package_name, self.info.effective_min_version()) {
            info!("{} already installed at a sufficient version, skipping download", self.package_name);
            reporter.success();
            return;
        }
        if !is_connected_to_network(self.host.connectivity.as_ref()) {
            error!("no network connection, cannot download {}", self.package_name);
            reporter.error_with_message(TaskErrorKind::Other, "not connected to a network");
            return;
        }

        if let Err(e) = self.host.settings.put_int(DPC_DOWNLOADED, 1) {
            warn!("could not record {DPC_DOWNLOADED}: {e}");
        }

        // Suscribirse antes de encolar para no perder la notificación.
        let completions = self.host.downloads.completions();

        if let Some(parent) = self.destination.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("could not create download directory {}: {e}", parent.display());
            }
        }

        let mut request = DownloadRequest::new(self.info.location()).destination(self.destination.clone());
        if let Some(cookie) = self.info.cookie_header() {
            request = request.header("Cookie", cookie);
            if self.debug {
                debug!("downloading with Cookie header: {cookie}");
            }
        }

        let id = match self.host.downloads.enqueue(request).await {
            Ok(id) => id,
            Err(e) => {
                error!("download of {} could not be enqueued: {e}", self.info.location());
                reporter.error_with_message(TaskErrorKind::DownloadFailed, e.to_string());
                return;
            }
        };
        info!("downloading {} as download {id}", self.info.location());
        self.download_id = Some(id);

        let downloads = self.host.downloads.clone();
        self.listener = Some(tokio::spawn(await_completion(downloads, id, completions, input.cancellation, reporter)));
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        if let Some(id) = self.download_id.take() {
            if self.host.downloads.remove(id) == 1 {
                debug!("removed download {id} and its file");
            } else {
                error!("could not remove installer file for download {id}");
            }
        }
        Ok(())
    }
}

/// Espera la finalización de `id` e informa exactamente una vez. Las
/// notificaciones de otras descargas y las repetidas se ignoran.
async fn await_completion(downloads: Arc<dyn DownloadManager>,
                          id: DownloadId,
                          mut completions: broadcast::Receiver<DownloadId>,
                          mut cancellation: CancellationSignal,
                          mut reporter: TaskReporter) {
    loop {
        let notified = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                reporter.error_with_message(TaskErrorKind::Other, "download cancelled");
                return;
            }
            received = completions.recv() => received,
        };
        match notified {
            Ok(other) if other != id => continue,
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => warn!("missed {missed} download notifications, polling download {id}"),
            Err(RecvError::Closed) => {
                reporter.error_with_message(TaskErrorKind::DownloadFailed, "download subsystem closed");
                return;
            }
        }
        match downloads.query(id) {
            Some(DownloadStatus::Successful { local_path }) => {
                info!("download {id} finished at {}", local_path.display());
                reporter.stop_timer();
                reporter.success_with_package(local_path);
                return;
            }
            Some(DownloadStatus::Failed { reason }) => {
                error!("download {id} failed with reason {reason}");
                reporter.error_with_message(TaskErrorKind::DownloadFailed, format!("download failed with reason {reason}"));
                return;
            }
            Some(DownloadStatus::Pending | DownloadStatus::Running) => continue,
            None => {
                error!("download {id} is no longer known to the download subsystem");
                reporter.error(TaskErrorKind::DownloadFailed);
                return;
            }
        }
    }
}
