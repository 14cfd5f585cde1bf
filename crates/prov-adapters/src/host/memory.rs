//! Anfitrión en memoria.
//!
//! Fakes guionables para cada capacidad. Comparten un diario (`journal`) donde
//! anotan lo que hicieron, útil para comprobar el orden de los pasos.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use prov_core::{Digester, Sha256Digester};
use prov_domain::{ProvisioningParams, UserId};
use tokio::sync::broadcast;

use super::{ConnectivityProbe, DownloadId, DownloadManager, DownloadRequest, DownloadStatus, HostAction, HostActions,
            HostError, HostServices, PackageInfo, PackageInstaller, PackageManager, SecureSettings};

pub type Journal = Arc<Mutex<Vec<String>>>;

fn note(journal: &Journal, entry: String) {
    if let Ok(mut j) = journal.lock() {
        j.push(entry);
    }
}

/// Comportamiento de una descarga según su URI.
#[derive(Debug, Clone)]
pub enum ScriptedDownload {
    /// Escribe `contents` en el destino (o en `redirect_to`) y notifica.
    Complete { contents: Vec<u8>, redirect_to: Option<PathBuf> },
    Fail { reason: i32 },
    /// Queda en curso hasta que el test llame a `complete`.
    Hang,
}

#[derive(Debug)]
pub struct MemoryDownloadManager {
    next_id: AtomicU64,
    scripts: Mutex<HashMap<String, ScriptedDownload>>,
    entries: Mutex<HashMap<DownloadId, DownloadStatus>>,
    requests: Mutex<Vec<DownloadRequest>>,
    removed: Mutex<Vec<DownloadId>>,
    duplicate_notifications: AtomicUsize,
    reject: AtomicBool,
    completions: broadcast::Sender<DownloadId>,
    journal: Journal,
}

impl Default for MemoryDownloadManager {
    fn default() -> Self {
        Self::with_journal(Journal::default())
    }
}

impl MemoryDownloadManager {
    pub fn with_journal(journal: Journal) -> Self {
        let (completions, _) = broadcast::channel(64);
        Self { next_id: AtomicU64::new(1),
               scripts: Mutex::new(HashMap::new()),
               entries: Mutex::new(HashMap::new()),
               requests: Mutex::new(Vec::new()),
               removed: Mutex::new(Vec::new()),
               duplicate_notifications: AtomicUsize::new(0),
               reject: AtomicBool::new(false),
               completions,
               journal }
    }

    pub fn script(&self, uri: impl Into<String>, behaviour: ScriptedDownload) {
        if let Ok(mut s) = self.scripts.lock() {
            s.insert(uri.into(), behaviour);
        }
    }

    /// Cantidad de notificaciones extra repetidas por cada finalización.
    pub fn set_duplicate_notifications(&self, extra: usize) {
        self.duplicate_notifications.store(extra, Ordering::SeqCst);
    }

    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Fija el estado de `id` y emite una notificación.
    pub fn complete(&self, id: DownloadId, status: DownloadStatus) {
        if let Ok(mut e) = self.entries.lock() {
            e.insert(id, status);
        }
        self.notify(id);
    }

    /// Emite una notificación sin tocar estados (p. ej. de otra descarga).
    pub fn notify(&self, id: DownloadId) {
        let _ = self.completions.send(id);
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn removed(&self) -> Vec<DownloadId> {
        self.removed.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    fn settle(&self, request: &DownloadRequest) -> Option<DownloadStatus> {
        let script = self.scripts
                         .lock()
                         .ok()
                         .and_then(|s| s.get(&request.uri).cloned())
                         .unwrap_or(ScriptedDownload::Complete { contents: Vec::new(),
                                                                 redirect_to: None });
        match script {
            ScriptedDownload::Hang => None,
            ScriptedDownload::Fail { reason } => Some(DownloadStatus::Failed { reason }),
            ScriptedDownload::Complete { contents, redirect_to } => {
                let Some(target) = redirect_to.or_else(|| request.destination.clone()) else {
                    return Some(DownloadStatus::Failed { reason: -1 });
                };
                if let Some(parent) = target.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                match std::fs::write(&target, contents) {
                    Ok(()) => Some(DownloadStatus::Successful { local_path: target }),
                    Err(e) => {
                        debug!("memory download could not write {}: {e}", target.display());
                        Some(DownloadStatus::Failed { reason: -1 })
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DownloadManager for MemoryDownloadManager {
    async fn enqueue(&self, request: DownloadRequest) -> Result<DownloadId, HostError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(HostError::DownloadRejected(request.uri));
        }
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst));
        note(&self.journal, format!("enqueue:{}", request.uri));
        if let Ok(mut r) = self.requests.lock() {
            r.push(request.clone());
        }
        match self.settle(&request) {
            Some(status) => {
                if let Ok(mut e) = self.entries.lock() {
                    e.insert(id, status);
                }
                let copies = 1 + self.duplicate_notifications.load(Ordering::SeqCst);
                for _ in 0..copies {
                    self.notify(id);
                }
            }
            None => {
                if let Ok(mut e) = self.entries.lock() {
                    e.insert(id, DownloadStatus::Running);
                }
            }
        }
        Ok(id)
    }

    fn completions(&self) -> broadcast::Receiver<DownloadId> {
        self.completions.subscribe()
    }

    fn query(&self, id: DownloadId) -> Option<DownloadStatus> {
        self.entries.lock().ok()?.get(&id).cloned()
    }

    fn remove(&self, id: DownloadId) -> usize {
        let Some(status) = self.entries.lock().ok().and_then(|mut e| e.remove(&id)) else {
            return 0;
        };
        if let DownloadStatus::Successful { local_path } = status {
            let _ = std::fs::remove_file(local_path);
        }
        note(&self.journal, format!("remove:{id}"));
        if let Ok(mut r) = self.removed.lock() {
            r.push(id);
        }
        1
    }
}

#[derive(Debug, Default)]
pub struct MemoryPackageManager {
    installed: Mutex<HashMap<String, u64>>,
    archives: Mutex<HashMap<PathBuf, PackageInfo>>,
}

impl MemoryPackageManager {
    pub fn set_installed(&self, package: impl Into<String>, version: u64) {
        if let Ok(mut i) = self.installed.lock() {
            i.insert(package.into(), version);
        }
    }

    /// Registra los metadatos que devolverá `archive_info(path)`.
    pub fn add_archive(&self, path: impl Into<PathBuf>, info: PackageInfo) {
        if let Ok(mut a) = self.archives.lock() {
            a.insert(path.into(), info);
        }
    }
}

impl PackageManager for MemoryPackageManager {
    fn installed_version(&self, package: &str) -> Option<u64> {
        self.installed.lock().ok()?.get(package).copied()
    }

    fn archive_info(&self, path: &Path) -> Option<PackageInfo> {
        self.archives.lock().ok()?.get(path).cloned()
    }
}

#[derive(Debug)]
pub struct StaticConnectivity(AtomicBool);

impl Default for StaticConnectivity {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl StaticConnectivity {
    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

impl ConnectivityProbe for StaticConnectivity {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, i64>>,
}

impl SecureSettings for MemorySettings {
    fn put_int(&self, key: &str, value: i64) -> Result<(), HostError> {
        let mut values = self.values.lock().map_err(|e| HostError::SettingsWrite { key: key.to_string(),
                                                                                  reason: e.to_string() })?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.lock().ok()?.get(key).copied()
    }
}

/// Instalador que marca como instalado el paquete del archivo.
#[derive(Debug)]
pub struct MemoryInstaller {
    packages: Arc<MemoryPackageManager>,
    installs: Mutex<Vec<(PathBuf, UserId)>>,
    failure: Mutex<Option<String>>,
    journal: Journal,
}

impl MemoryInstaller {
    pub fn new(packages: Arc<MemoryPackageManager>, journal: Journal) -> Self {
        Self { packages,
               installs: Mutex::new(Vec::new()),
               failure: Mutex::new(None),
               journal }
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        if let Ok(mut f) = self.failure.lock() {
            *f = Some(reason.into());
        }
    }

    pub fn installs(&self) -> Vec<(PathBuf, UserId)> {
        self.installs.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PackageInstaller for MemoryInstaller {
    async fn install(&self, archive: &Path, user_id: UserId) -> Result<(), HostError> {
        note(&self.journal, format!("install:{}", archive.display()));
        if let Some(reason) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(HostError::Install(reason));
        }
        let info = self.packages
                       .archive_info(archive)
                       .ok_or_else(|| HostError::Install(format!("cannot parse {}", archive.display())))?;
        self.packages.set_installed(info.package_name, info.version_code);
        if let Ok(mut i) = self.installs.lock() {
            i.push((archive.to_path_buf(), user_id));
        }
        Ok(())
    }
}

/// Acción que sólo anota sus invocaciones.
#[derive(Debug)]
pub struct RecordingAction {
    name: String,
    calls: Mutex<Vec<UserId>>,
    failure: Mutex<Option<String>>,
    journal: Journal,
}

impl RecordingAction {
    pub fn new(name: impl Into<String>, journal: Journal) -> Self {
        Self { name: name.into(),
               calls: Mutex::new(Vec::new()),
               failure: Mutex::new(None),
               journal }
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        if let Ok(mut f) = self.failure.lock() {
            *f = Some(reason.into());
        }
    }

    pub fn calls(&self) -> Vec<UserId> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HostAction for RecordingAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn perform(&self, params: &ProvisioningParams, user_id: UserId) -> Result<(), HostError> {
        note(&self.journal, format!("action:{}:{}", self.name, params.infer_device_admin_package_name()));
        if let Some(reason) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(HostError::Action { action: self.name.clone(),
                                           reason });
        }
        if let Ok(mut c) = self.calls.lock() {
            c.push(user_id);
        }
        Ok(())
    }
}

/// SHA-256 real con respuestas forzables por archivo y un interruptor para
/// que los digests de bytes no produzcan valor.
#[derive(Debug, Default)]
pub struct ScriptedDigester {
    file_overrides: Mutex<HashMap<PathBuf, Option<Vec<u8>>>>,
    bytes_unavailable: AtomicBool,
}

impl ScriptedDigester {
    pub fn override_file(&self, path: impl Into<PathBuf>, digest: Option<Vec<u8>>) {
        if let Ok(mut o) = self.file_overrides.lock() {
            o.insert(path.into(), digest);
        }
    }

    pub fn set_bytes_unavailable(&self, unavailable: bool) {
        self.bytes_unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Digester for ScriptedDigester {
    fn hash_file(&self, path: &Path) -> Option<Vec<u8>> {
        if let Some(forced) = self.file_overrides.lock().ok().and_then(|o| o.get(path).cloned()) {
            return forced;
        }
        Sha256Digester.hash_file(path)
    }

    fn hash_bytes(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        if self.bytes_unavailable.load(Ordering::SeqCst) {
            return None;
        }
        Sha256Digester.hash_bytes(bytes)
    }
}

/// Anfitrión completo en memoria con handles a cada fake.
#[derive(Clone)]
pub struct MemoryHost {
    pub journal: Journal,
    pub downloads: Arc<MemoryDownloadManager>,
    pub packages: Arc<MemoryPackageManager>,
    pub connectivity: Arc<StaticConnectivity>,
    pub settings: Arc<MemorySettings>,
    pub installer: Arc<MemoryInstaller>,
    pub digester: Arc<ScriptedDigester>,
    pub create_profile: Arc<RecordingAction>,
    pub set_device_owner: Arc<RecordingAction>,
    pub set_profile_owner: Arc<RecordingAction>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        let journal = Journal::default();
        let packages = Arc::new(MemoryPackageManager::default());
        Self { downloads: Arc::new(MemoryDownloadManager::with_journal(journal.clone())),
               installer: Arc::new(MemoryInstaller::new(packages.clone(), journal.clone())),
               packages,
               connectivity: Arc::new(StaticConnectivity::default()),
               settings: Arc::new(MemorySettings::default()),
               digester: Arc::new(ScriptedDigester::default()),
               create_profile: Arc::new(RecordingAction::new("create_profile", journal.clone())),
               set_device_owner: Arc::new(RecordingAction::new("set_device_owner", journal.clone())),
               set_profile_owner: Arc::new(RecordingAction::new("set_profile_owner", journal.clone())),
               journal }
    }

    pub fn services(&self) -> HostServices {
        HostServices { downloads: self.downloads.clone(),
                       packages: self.packages.clone(),
                       connectivity: self.connectivity.clone(),
                       settings: self.settings.clone(),
                       installer: self.installer.clone(),
                       digester: self.digester.clone(),
                       actions: HostActions { create_profile: self.create_profile.clone(),
                                              set_device_owner: self.set_device_owner.clone(),
                                              set_profile_owner: self.set_profile_owner.clone() } }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }
}
