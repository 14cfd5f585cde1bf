use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Tipo de aprovisionamiento solicitado; selecciona la variante del pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvisioningAction {
    #[serde(rename = "android.app.action.PROVISION_MANAGED_DEVICE")]
    ManagedDevice,
    #[serde(rename = "android.app.action.PROVISION_MANAGED_PROFILE")]
    ManagedProfile,
    #[serde(rename = "android.app.action.PROVISION_MANAGED_USER")]
    ManagedUser,
    #[serde(rename = "android.app.action.PROVISION_FINANCED_DEVICE")]
    FinancedDevice,
}

impl ProvisioningAction {
    pub const ALL: [ProvisioningAction; 4] = [Self::ManagedDevice, Self::ManagedProfile, Self::ManagedUser, Self::FinancedDevice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagedDevice => "android.app.action.PROVISION_MANAGED_DEVICE",
            Self::ManagedProfile => "android.app.action.PROVISION_MANAGED_PROFILE",
            Self::ManagedUser => "android.app.action.PROVISION_MANAGED_USER",
            Self::FinancedDevice => "android.app.action.PROVISION_FINANCED_DEVICE",
        }
    }

    /// `true` si el flujo termina con un device owner (dispositivo completo).
    pub fn is_device_provisioning(&self) -> bool {
        matches!(self, Self::ManagedDevice | Self::FinancedDevice)
    }

    /// `true` si el flujo necesita crear un perfil antes de instalar.
    pub fn creates_profile(&self) -> bool {
        matches!(self, Self::ManagedProfile)
    }
}

impl fmt::Display for ProvisioningAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProvisioningAction {
    type Err = DomainError;

    /// Acepta tanto el nombre completo de la acción como el sufijo corto
    /// (`PROVISION_MANAGED_DEVICE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL.iter()
                 .copied()
                 .find(|a| {
                     let full = a.as_str();
                     full == trimmed || full.rsplit('.').next() == Some(trimmed)
                 })
                 .ok_or_else(|| DomainError::UnknownAction(trimmed.to_string()))
    }
}
