//! prov-domain: modelo inmutable de una solicitud de aprovisionamiento.
//!
//! Los tipos de este crate se construyen una sola vez (antes de arrancar el
//! pipeline) y nunca se mutan. El invocador puede partir de la forma serde
//! (`ProvisioningRequest`) o de los builders.
pub mod action;
pub mod component;
pub mod download_info;
pub mod error;
pub mod params;
pub mod request;

pub use action::ProvisioningAction;
pub use component::ComponentName;
pub use download_info::{ChecksumSpec, PackageDownloadInfo, PackageDownloadInfoBuilder};
pub use error::DomainError;
pub use params::{ProvisioningParams, ProvisioningParamsBuilder};
pub use request::{DownloadInfoRequest, ProvisioningRequest};

/// Identificador del usuario del sistema sobre el que corre el pipeline.
pub type UserId = u32;
