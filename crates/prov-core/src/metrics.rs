//! Métricas de duración por paso.
//!
//! Sólo se registra la duración de pasos que detuvieron su temporizador antes
//! de reportar éxito; los fallos no se miden.
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricsCategory {
    DownloadPackageTaskMs,
    VerifyPackageTaskMs,
    InstallPackageTaskMs,
    HostActionTaskMs(String),
}

impl fmt::Display for MetricsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DownloadPackageTaskMs => f.write_str("provisioning_download_package_task_ms"),
            Self::VerifyPackageTaskMs => f.write_str("provisioning_verify_package_task_ms"),
            Self::InstallPackageTaskMs => f.write_str("provisioning_install_package_task_ms"),
            Self::HostActionTaskMs(action) => write!(f, "provisioning_{action}_task_ms"),
        }
    }
}

/// Destino de las duraciones registradas por el runner.
pub trait MetricsSink: Send {
    fn record(&mut self, category: &MetricsCategory, elapsed: Duration);
}

/// Sink en memoria. Los clones comparten el mismo buffer, así el invocador
/// conserva un handle mientras el engine es dueño de otro.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    inner: Arc<Mutex<Vec<(MetricsCategory, Duration)>>>,
}

impl InMemoryMetrics {
    pub fn recorded(&self) -> Vec<(MetricsCategory, Duration)> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<MetricsCategory> {
        self.recorded().into_iter().map(|(c, _)| c).collect()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record(&mut self, category: &MetricsCategory, elapsed: Duration) {
        if let Ok(mut v) = self.inner.lock() {
            v.push((category.clone(), elapsed));
        }
    }
}
