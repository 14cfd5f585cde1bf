//! Preparación de un anfitrión en memoria para una solicitud dada.
use prov_adapters::host::memory::{MemoryHost, ScriptedDownload};
use prov_adapters::host::{PackageInfo, ReceiverInfo, Signature};
use prov_core::{compute_hash_of_byte_array, hash_hex, ProvisioningConfig};
use prov_domain::{DownloadInfoRequest, ProvisioningParams, ProvisioningRequest};

pub const DEMO_PACKAGE: &str = "com.example.dpc";
pub const DEMO_LOCATION: &str = "https://dpc.example.com/dpc.apk";
pub const DEMO_PAYLOAD: &[u8] = b"provflow demo device policy controller";
pub const DEMO_SIGNATURE: &[u8] = b"provflow demo signing certificate";

/// Solicitud de ejemplo con la suma real de `DEMO_PAYLOAD`.
pub fn demo_request() -> ProvisioningRequest {
    let checksum = compute_hash_of_byte_array(DEMO_PAYLOAD).map(|d| hash_hex(&d));
    ProvisioningRequest { provisioning_action: "PROVISION_MANAGED_DEVICE".into(),
                          device_admin_package_name: Some(DEMO_PACKAGE.into()),
                          device_admin_component_name: Some(format!("{DEMO_PACKAGE}/.DeviceAdmin")),
                          device_admin_download_info: Some(DownloadInfoRequest { location: DEMO_LOCATION.into(),
                                                                                 min_version: Some(2),
                                                                                 cookie_header: Some("session=demo".into()),
                                                                                 package_checksum: checksum,
                                                                                 signature_checksum: None }),
                          support_url: Some("https://support.example.com".into()),
                          organization_name: Some("Example Corp".into()) }
}

/// Hace que la descarga de `params` escriba `payload` en el destino y que el
/// archivo resultante declare el receptor admin esperado.
pub fn stage_package(host: &MemoryHost, params: &ProvisioningParams, config: &ProvisioningConfig, payload: &[u8]) {
    let Some(info) = params.download_info() else {
        return;
    };
    let package = params.infer_device_admin_package_name();
    let receiver = match params.device_admin_component_name() {
        Some(component) => component.class_name().to_string(),
        None => format!("{package}.DeviceAdmin"),
    };
    host.downloads.script(info.location(),
                          ScriptedDownload::Complete { contents: payload.to_vec(),
                                                       redirect_to: None });
    host.packages.add_archive(config.download_destination(),
                              PackageInfo { package_name: package.to_string(),
                                            version_code: info.min_version().unwrap_or(1),
                                            signatures: vec![Signature(DEMO_SIGNATURE.to_vec())],
                                            receivers: vec![ReceiverInfo::device_admin(receiver)] });
}
