use prov_adapters::build_provisioning_tasks;
use prov_adapters::host::memory::MemoryHost;
use prov_core::ProvisioningConfig;
use prov_domain::{DomainError, PackageDownloadInfo, ProvisioningAction, ProvisioningParams};

const PKG: &str = "sample.package.name";

fn params(action: ProvisioningAction, with_download: bool) -> ProvisioningParams {
    let mut builder = ProvisioningParams::builder(action).device_admin_package_name(PKG);
    if with_download {
        builder = builder.download_info(PackageDownloadInfo::builder().location("https://example.com/dpc.apk")
                                                                      .package_checksum(vec![1, 2, 3])
                                                                      .build()
                                                                      .unwrap());
    }
    builder.build().unwrap()
}

fn ids(params: &ProvisioningParams, host: &MemoryHost) -> Vec<String> {
    build_provisioning_tasks(params, &host.services(), &ProvisioningConfig::default()).unwrap()
                                                                                     .iter()
                                                                                     .map(|t| t.id().to_string())
                                                                                     .collect()
}

#[test]
fn device_provisioning_ends_with_device_owner() {
    let host = MemoryHost::new();
    assert_eq!(ids(&params(ProvisioningAction::ManagedDevice, true), &host),
               vec!["download_package", "verify_package", "install_package", "set_device_owner"]);
    assert_eq!(ids(&params(ProvisioningAction::FinancedDevice, true), &host).last().map(String::as_str),
               Some("set_device_owner"));
}

#[test]
fn profile_provisioning_creates_profile_first() {
    let host = MemoryHost::new();
    assert_eq!(ids(&params(ProvisioningAction::ManagedProfile, true), &host),
               vec!["create_profile", "download_package", "verify_package", "install_package", "set_profile_owner"]);
}

#[test]
fn download_steps_omitted_without_download_info() {
    let host = MemoryHost::new();
    host.packages.set_installed(PKG, 1);
    assert_eq!(ids(&params(ProvisioningAction::ManagedUser, false), &host),
               vec!["install_package", "set_profile_owner"]);
}

#[test]
fn missing_target_without_download_info_is_rejected() {
    let host = MemoryHost::new();
    let err = build_provisioning_tasks(&params(ProvisioningAction::ManagedDevice, false),
                                       &host.services(),
                                       &ProvisioningConfig::default()).err()
                                                                      .unwrap();
    assert!(matches!(err, DomainError::ValidationError(msg) if msg.contains(PKG)));
}
