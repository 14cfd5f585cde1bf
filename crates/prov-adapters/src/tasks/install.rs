use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use prov_core::{CleanupError, MetricsCategory, ProvisioningTask, TaskErrorKind, TaskInput, TaskReporter};

use crate::host::PackageInstaller;

const ID: &str = "install_package";

/// Instala el archivo publicado por la descarga. Sin archivo, el paquete ya
/// estaba instalado y el paso termina con éxito.
pub struct InstallPackageTask {
    installer: Arc<dyn PackageInstaller>,
    package_name: String,
}

impl InstallPackageTask {
    pub fn new(installer: Arc<dyn PackageInstaller>, package_name: impl Into<String>) -> Self {
        Self { installer,
               package_name: package_name.into() }
    }
}

#[async_trait]
impl ProvisioningTask for InstallPackageTask {
    fn id(&self) -> &str {
        ID
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::InstallPackageTaskMs
    }

    async fn run(&mut self, input: TaskInput, mut reporter: TaskReporter) {
        let Some(path) = input.package_location else {
            info!("{} already installed, nothing to install", self.package_name);
            reporter.success();
            return;
        };
        match self.installer.install(&path, input.user_id).await {
            Ok(()) => {
                info!("installed {} for user {}", self.package_name, input.user_id);
                reporter.stop_timer();
                reporter.success();
            }
            Err(e) => {
                error!("installing {} failed: {e}", self.package_name);
                reporter.error_with_message(TaskErrorKind::InstallFailed, e.to_string());
            }
        }
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        Ok(())
    }
}
