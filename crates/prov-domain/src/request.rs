//! Forma serializable de la solicitud del invocador.
//!
//! Refleja las opciones reconocidas (`provisioningAction`,
//! `deviceAdminPackageName`, `deviceAdminDownloadInfo.*`, ...). Las sumas de
//! verificación viajan como hex. La conversión a `ProvisioningParams` aplica
//! todas las validaciones del modelo.
use serde::{Deserialize, Serialize};

use crate::{ComponentName, DomainError, PackageDownloadInfo, ProvisioningAction, ProvisioningParams};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequest {
    pub provisioning_action: String,
    #[serde(default)]
    pub device_admin_package_name: Option<String>,
    #[serde(default)]
    pub device_admin_component_name: Option<String>,
    #[serde(default)]
    pub device_admin_download_info: Option<DownloadInfoRequest>,
    #[serde(default)]
    pub support_url: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfoRequest {
    pub location: String,
    #[serde(default)]
    pub min_version: Option<u64>,
    #[serde(default)]
    pub cookie_header: Option<String>,
    /// SHA-256 del archivo, en hex.
    #[serde(default)]
    pub package_checksum: Option<String>,
    /// SHA-256 de alguna firma del archivo, en hex.
    #[serde(default)]
    pub signature_checksum: Option<String>,
}

fn decode_checksum(field: &'static str, raw: Option<&str>) -> Result<Vec<u8>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(hex_str) => hex::decode(hex_str).map_err(|e| DomainError::MalformedChecksum { field,
                                                                                           reason: e.to_string() }),
    }
}

impl TryFrom<&DownloadInfoRequest> for PackageDownloadInfo {
    type Error = DomainError;

    fn try_from(req: &DownloadInfoRequest) -> Result<Self, Self::Error> {
        let mut builder = PackageDownloadInfo::builder().location(req.location.clone())
                                                        .package_checksum(decode_checksum("packageChecksum", req.package_checksum.as_deref())?)
                                                        .signature_checksum(decode_checksum("signatureChecksum", req.signature_checksum.as_deref())?);
        if let Some(v) = req.min_version {
            builder = builder.min_version(v);
        }
        if let Some(cookie) = &req.cookie_header {
            builder = builder.cookie_header(cookie.clone());
        }
        builder.build()
    }
}

impl TryFrom<ProvisioningRequest> for ProvisioningParams {
    type Error = DomainError;

    fn try_from(req: ProvisioningRequest) -> Result<Self, Self::Error> {
        let action: ProvisioningAction = req.provisioning_action.parse()?;
        let mut builder = ProvisioningParams::builder(action);
        if let Some(pkg) = req.device_admin_package_name {
            builder = builder.device_admin_package_name(pkg);
        }
        if let Some(raw) = req.device_admin_component_name {
            builder = builder.device_admin_component_name(raw.parse::<ComponentName>()?);
        }
        if let Some(info) = &req.device_admin_download_info {
            builder = builder.download_info(PackageDownloadInfo::try_from(info)?);
        }
        if let Some(url) = req.support_url {
            builder = builder.support_url(url);
        }
        if let Some(org) = req.organization_name {
            builder = builder.organization_name(org);
        }
        builder.build()
    }
}

impl ProvisioningRequest {
    /// Decodifica un mensaje JSON y lo valida en un solo paso.
    pub fn parse_params(json: &str) -> Result<ProvisioningParams, DomainError> {
        let req: ProvisioningRequest = serde_json::from_str(json).map_err(|e| DomainError::ValidationError(format!("malformed request: {e}")))?;
        ProvisioningParams::try_from(req)
    }
}
