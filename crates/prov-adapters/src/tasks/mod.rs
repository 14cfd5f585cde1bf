//! Pasos concretos del pipeline.
mod download;
mod host_action;
mod install;
mod verify;

pub use download::{DownloadPackageTask, DPC_DOWNLOADED};
pub use host_action::HostActionTask;
pub use install::InstallPackageTask;
pub use verify::VerifyPackageTask;
