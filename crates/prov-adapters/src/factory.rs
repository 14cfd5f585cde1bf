//! Armado de la lista ordenada de pasos según la acción solicitada.
use std::sync::Arc;

use log::info;
use prov_core::{ProvisioningConfig, ProvisioningTask};
use prov_domain::{DomainError, ProvisioningParams};

use crate::host::HostServices;
use crate::probes::package_requires_update;
use crate::tasks::{DownloadPackageTask, HostActionTask, InstallPackageTask, VerifyPackageTask};

/// Construye los pasos en orden de ejecución:
///
/// - perfil administrado: crear perfil antes de todo;
/// - descarga y verificación, sólo si hay `PackageDownloadInfo`;
/// - instalación;
/// - paso terminal: device owner (dispositivo) o profile owner (perfil/usuario).
///
/// Falla si no hay información de descarga y el paquete no está instalado,
/// porque el objetivo no estaría disponible de ningún modo.
pub fn build_provisioning_tasks(params: &ProvisioningParams,
                                host: &HostServices,
                                config: &ProvisioningConfig)
                                -> Result<Vec<Box<dyn ProvisioningTask>>, DomainError> {
    let package = params.infer_device_admin_package_name().to_string();
    if params.download_info().is_none() && package_requires_update(host.packages.as_ref(), &package, 0) {
        return Err(DomainError::ValidationError(format!("{package} is not installed and no download location was given")));
    }

    let action = params.action();
    let shared = Arc::new(params.clone());
    let mut tasks: Vec<Box<dyn ProvisioningTask>> = Vec::new();

    if action.creates_profile() {
        tasks.push(Box::new(HostActionTask::new(host.actions.create_profile.clone(), shared.clone())));
    }
    if let Some(download) = params.download_info() {
        tasks.push(Box::new(DownloadPackageTask::new(host.clone(), package.clone(), download.clone(), config)));
        tasks.push(Box::new(VerifyPackageTask::new(host.packages.clone(),
                                                   host.digester.clone(),
                                                   package.clone(),
                                                   params.device_admin_component_name().cloned(),
                                                   download.checksum().clone())));
    }
    tasks.push(Box::new(InstallPackageTask::new(host.installer.clone(), package.clone())));

    let owner = if action.is_device_provisioning() {
        host.actions.set_device_owner.clone()
    } else {
        host.actions.set_profile_owner.clone()
    };
    tasks.push(Box::new(HostActionTask::new(owner, shared)));

    info!("assembled {} steps for {action} targeting {package}", tasks.len());
    Ok(tasks)
}
