//! `ProvisioningParams`: descriptor inmutable de la solicitud.
use serde::{Deserialize, Serialize};

use crate::download_info::{is_absolute_url, PackageDownloadInfo};
use crate::{ComponentName, DomainError, ProvisioningAction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct ProvisioningParams {
    action: ProvisioningAction,
    device_admin_package_name: Option<String>,
    device_admin_component_name: Option<ComponentName>,
    download_info: Option<PackageDownloadInfo>,
    support_url: Option<String>,
    organization_name: Option<String>,
}

/// Forma serde sin validar; toda deserialización pasa por el builder.
#[derive(Deserialize)]
struct RawParams {
    action: ProvisioningAction,
    device_admin_package_name: Option<String>,
    device_admin_component_name: Option<ComponentName>,
    download_info: Option<PackageDownloadInfo>,
    support_url: Option<String>,
    organization_name: Option<String>,
}

impl TryFrom<RawParams> for ProvisioningParams {
    type Error = DomainError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        let mut builder = Self::builder(raw.action);
        builder.device_admin_package_name = raw.device_admin_package_name;
        builder.device_admin_component_name = raw.device_admin_component_name;
        builder.download_info = raw.download_info;
        builder.support_url = raw.support_url;
        builder.organization_name = raw.organization_name;
        builder.build()
    }
}

impl ProvisioningParams {
    pub fn builder(action: ProvisioningAction) -> ProvisioningParamsBuilder {
        ProvisioningParamsBuilder { action,
                                    device_admin_package_name: None,
                                    device_admin_component_name: None,
                                    download_info: None,
                                    support_url: None,
                                    organization_name: None }
    }

    pub fn action(&self) -> ProvisioningAction {
        self.action
    }

    pub fn device_admin_package_name(&self) -> Option<&str> {
        self.device_admin_package_name.as_deref()
    }

    pub fn device_admin_component_name(&self) -> Option<&ComponentName> {
        self.device_admin_component_name.as_ref()
    }

    /// Paquete objetivo: el nombre explícito o, en su defecto, el paquete del
    /// componente. El builder garantiza que alguno de los dos existe.
    pub fn infer_device_admin_package_name(&self) -> &str {
        match (&self.device_admin_package_name, &self.device_admin_component_name) {
            (Some(pkg), _) => pkg,
            (None, Some(component)) => component.package_name(),
            (None, None) => "",
        }
    }

    pub fn download_info(&self) -> Option<&PackageDownloadInfo> {
        self.download_info.as_ref()
    }

    /// URL de soporte tal como llegó (opaca para el pipeline).
    pub fn support_url(&self) -> Option<&str> {
        self.support_url.as_deref()
    }

    /// URL de soporte sólo si es una URL web válida; la UI ignora las demás.
    pub fn valid_support_url(&self) -> Option<&str> {
        self.support_url
            .as_deref()
            .filter(|u| is_absolute_url(u) && (u.starts_with("http://") || u.starts_with("https://")))
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.organization_name.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct ProvisioningParamsBuilder {
    action: ProvisioningAction,
    device_admin_package_name: Option<String>,
    device_admin_component_name: Option<ComponentName>,
    download_info: Option<PackageDownloadInfo>,
    support_url: Option<String>,
    organization_name: Option<String>,
}

impl ProvisioningParamsBuilder {
    pub fn device_admin_package_name(mut self, package: impl Into<String>) -> Self {
        self.device_admin_package_name = Some(package.into());
        self
    }

    pub fn device_admin_component_name(mut self, component: ComponentName) -> Self {
        self.device_admin_component_name = Some(component);
        self
    }

    pub fn download_info(mut self, info: PackageDownloadInfo) -> Self {
        self.download_info = Some(info);
        self
    }

    pub fn support_url(mut self, url: impl Into<String>) -> Self {
        self.support_url = Some(url.into());
        self
    }

    pub fn organization_name(mut self, name: impl Into<String>) -> Self {
        self.organization_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<ProvisioningParams, DomainError> {
        if let Some(pkg) = &self.device_admin_package_name {
            if pkg.trim().is_empty() {
                return Err(DomainError::ValidationError("device admin package name must be non-empty".into()));
            }
        }
        match (&self.device_admin_package_name, &self.device_admin_component_name) {
            (None, None) => {
                return Err(DomainError::ValidationError("either a device admin package name or a component name is required".into()))
            }
            (Some(pkg), Some(component)) if pkg != component.package_name() => {
                return Err(DomainError::ValidationError(format!("component {component} does not belong to package {pkg}")))
            }
            _ => {}
        }
        Ok(ProvisioningParams { action: self.action,
                                device_admin_package_name: self.device_admin_package_name,
                                device_admin_component_name: self.device_admin_component_name,
                                download_info: self.download_info,
                                support_url: self.support_url,
                                organization_name: self.organization_name })
    }
}
