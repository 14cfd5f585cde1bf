use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use prov_core::{constant_time_eq, hash_hex, CleanupError, Digester, MetricsCategory, ProvisioningTask, TaskErrorKind,
                TaskInput, TaskReporter};
use prov_domain::{ChecksumSpec, ComponentName};

use crate::host::{PackageInfo, PackageManager};
use crate::probes::find_device_admin_in_package_info;

const ID: &str = "verify_package";

/// Verifica el paquete descargado: debe contener el receptor device-admin y
/// su digest (del archivo o de alguna firma) debe coincidir con el esperado.
pub struct VerifyPackageTask {
    packages: Arc<dyn PackageManager>,
    digester: Arc<dyn Digester>,
    package_name: String,
    component: Option<ComponentName>,
    checksum: ChecksumSpec,
}

impl VerifyPackageTask {
    pub fn new(packages: Arc<dyn PackageManager>,
               digester: Arc<dyn Digester>,
               package_name: impl Into<String>,
               component: Option<ComponentName>,
               checksum: ChecksumSpec)
               -> Self {
        Self { packages,
               digester,
               package_name: package_name.into(),
               component,
               checksum }
    }

    async fn package_hash_matches(&self, path: PathBuf, expected: &[u8]) -> bool {
        let digester = self.digester.clone();
        let computed = match tokio::task::spawn_blocking(move || digester.hash_file(&path)).await {
            Ok(computed) => computed,
            Err(e) => {
                warn!("hashing task failed: {e}");
                None
            }
        };
        match computed {
            Some(digest) => {
                let matches = constant_time_eq(&digest, expected);
                if !matches {
                    warn!("package hash {} does not match expected {}", hash_hex(&digest), hash_hex(expected));
                }
                matches
            }
            None => {
                warn!("could not compute package hash");
                false
            }
        }
    }

    fn signature_hash_matches(&self, info: &PackageInfo, expected: &[u8]) -> bool {
        if info.signatures.is_empty() {
            warn!("package {} carries no signatures", info.package_name);
        }
        info.signatures.iter().any(|sig| {
                                  self.digester
                                      .hash_bytes(sig.as_bytes())
                                      .is_some_and(|digest| constant_time_eq(&digest, expected))
                              })
    }
}

#[async_trait]
impl ProvisioningTask for VerifyPackageTask {
    fn id(&self) -> &str {
        ID
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::VerifyPackageTaskMs
    }

    async fn run(&mut self, input: TaskInput, mut reporter: TaskReporter) {
        // Sin archivo no hubo descarga: nada que verificar.
        let Some(path) = input.package_location else {
            info!("no downloaded package to verify");
            reporter.success();
            return;
        };

        let Some(info) = self.packages.archive_info(&path) else {
            error!("could not read package archive {}", path.display());
            reporter.error(TaskErrorKind::DeviceAdminMissing);
            return;
        };
        if find_device_admin_in_package_info(&self.package_name, self.component.as_ref(), &info).is_none() {
            error!("package {} has no usable device admin receiver", self.package_name);
            reporter.error(TaskErrorKind::DeviceAdminMissing);
            return;
        }

        let verified = match &self.checksum {
            ChecksumSpec::PackageHash(expected) => self.package_hash_matches(path, expected).await,
            ChecksumSpec::SignatureHash(expected) => self.signature_hash_matches(&info, expected),
        };
        if verified {
            info!("package {} verified", self.package_name);
            reporter.stop_timer();
            reporter.success();
        } else {
            error!("checksum verification failed for {}", self.package_name);
            reporter.error(TaskErrorKind::HashMismatch);
        }
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        Ok(())
    }
}
