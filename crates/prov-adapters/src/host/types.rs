use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Permiso que declara un receptor device-admin.
pub const BIND_DEVICE_ADMIN: &str = "android.permission.BIND_DEVICE_ADMIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub uri: String,
    /// Destino sugerido; el subsistema puede elegir otro.
    pub destination: Option<PathBuf>,
    pub headers: Vec<(String, String)>,
}

impl DownloadRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(),
               destination: None,
               headers: Vec::new() }
    }

    pub fn destination(mut self, path: PathBuf) -> Self {
        self.destination = Some(path);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    Running,
    /// Ruta real donde quedó el archivo.
    Successful { local_path: PathBuf },
    /// `reason` es el código numérico del subsistema.
    Failed { reason: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    /// Nombre de clase completo.
    pub class_name: String,
    pub permission: Option<String>,
}

impl ReceiverInfo {
    pub fn device_admin(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(),
               permission: Some(BIND_DEVICE_ADMIN.to_string()) }
    }

    pub fn is_device_admin(&self) -> bool {
        self.permission.as_deref() == Some(BIND_DEVICE_ADMIN)
    }
}

/// Metadatos extraídos de un archivo de paquete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub package_name: String,
    pub version_code: u64,
    pub signatures: Vec<Signature>,
    pub receivers: Vec<ReceiverInfo>,
}
