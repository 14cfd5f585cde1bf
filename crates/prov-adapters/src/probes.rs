//! Sondas de entorno sin estado usadas por la factoría y por los pasos.
use log::debug;
use prov_domain::ComponentName;

use crate::host::{ConnectivityProbe, PackageInfo, PackageManager};

/// `true` si el paquete no está instalado o su versión es menor que
/// `min_version`.
pub fn package_requires_update(packages: &dyn PackageManager, package: &str, min_version: u64) -> bool {
    match packages.installed_version(package) {
        Some(version) if version >= min_version => {
            debug!("package {package} installed at version {version} (min {min_version})");
            false
        }
        Some(version) => {
            debug!("package {package} at version {version} requires update to {min_version}");
            true
        }
        None => true,
    }
}

pub fn is_connected_to_network(connectivity: &dyn ConnectivityProbe) -> bool {
    connectivity.is_connected()
}

/// Localiza el receptor device-admin dentro de `info`.
///
/// Con un componente dado, éste debe estar declarado como receptor admin del
/// paquete. Sin componente, se acepta el único receptor admin si es único.
pub fn find_device_admin_in_package_info(package: &str,
                                         component: Option<&ComponentName>,
                                         info: &PackageInfo)
                                         -> Option<ComponentName> {
    if info.package_name != package {
        debug!("archive declares package {} but {package} was expected", info.package_name);
        return None;
    }
    let mut admins = info.receivers.iter().filter(|r| r.is_device_admin());
    match component {
        Some(wanted) => {
            if wanted.package_name() != package {
                return None;
            }
            admins.find(|r| r.class_name == wanted.class_name())
                  .map(|_| wanted.clone())
        }
        None => {
            let first = admins.next()?;
            if admins.next().is_some() {
                debug!("package {package} declares more than one device admin receiver");
                return None;
            }
            ComponentName::new(package, first.class_name.clone()).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryPackageManager;
    use crate::host::ReceiverInfo;

    const PKG: &str = "sample.package.name";

    fn info(receivers: Vec<ReceiverInfo>) -> PackageInfo {
        PackageInfo { package_name: PKG.into(),
                      version_code: 1,
                      signatures: vec![],
                      receivers }
    }

    #[test]
    fn requires_update_compares_installed_version() {
        let pm = MemoryPackageManager::default();
        assert!(package_requires_update(&pm, PKG, 1));
        pm.set_installed(PKG, 5);
        assert!(!package_requires_update(&pm, PKG, 5));
        assert!(package_requires_update(&pm, PKG, 6));
        assert!(package_requires_update(&pm, PKG, u64::MAX));
    }

    #[test]
    fn finds_declared_component() {
        let c = ComponentName::new(PKG, format!("{PKG}.Admin")).unwrap();
        let i = info(vec![ReceiverInfo::device_admin(format!("{PKG}.Other")), ReceiverInfo::device_admin(format!("{PKG}.Admin"))]);
        assert_eq!(find_device_admin_in_package_info(PKG, Some(&c), &i), Some(c));
    }

    #[test]
    fn declared_component_must_be_admin_receiver() {
        let c = ComponentName::new(PKG, format!("{PKG}.Admin")).unwrap();
        let plain = ReceiverInfo { class_name: format!("{PKG}.Admin"),
                                   permission: None };
        assert_eq!(find_device_admin_in_package_info(PKG, Some(&c), &info(vec![plain])), None);
    }

    #[test]
    fn unique_admin_inferred_without_component() {
        let i = info(vec![ReceiverInfo::device_admin(format!("{PKG}.Admin"))]);
        let found = find_device_admin_in_package_info(PKG, None, &i).unwrap();
        assert_eq!(found.class_name(), format!("{PKG}.Admin"));

        let two = info(vec![ReceiverInfo::device_admin("a.A"), ReceiverInfo::device_admin("a.B")]);
        assert_eq!(find_device_admin_in_package_info(PKG, None, &two), None);
        assert_eq!(find_device_admin_in_package_info(PKG, None, &info(vec![])), None);
    }

    #[test]
    fn package_name_mismatch_is_rejected() {
        let i = info(vec![ReceiverInfo::device_admin(format!("{PKG}.Admin"))]);
        assert_eq!(find_device_admin_in_package_info("other.pkg", None, &i), None);
    }
}
