//! Carga de configuración desde variables de entorno.
//! Usa `.env` si existe (cargado una única vez).

use std::env;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use thiserror::Error;

pub const EXTERNAL_FILES_DIR_VAR: &str = "PROVFLOW_EXTERNAL_FILES_DIR";
pub const DEBUG_VAR: &str = "PROVFLOW_DEBUG";

const DEFAULT_EXTERNAL_FILES_DIR: &str = "./external-files";
const DOWNLOAD_CACHE_DIR: &str = "download_cache";
const DOWNLOADED_APP_FILE: &str = "managed_provisioning_downloaded_app.apk";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Directorio base de archivos externos de la app.
    pub external_files_dir: PathBuf,
    /// Habilita logs detallados del request (p.ej. la cabecera cookie).
    pub debug: bool,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self { external_files_dir: PathBuf::from(DEFAULT_EXTERNAL_FILES_DIR),
               debug: false }
    }
}

impl ProvisioningConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let external_files_dir = env::var(EXTERNAL_FILES_DIR_VAR).ok()
                                                                 .filter(|v| !v.trim().is_empty())
                                                                 .map(PathBuf::from)
                                                                 .unwrap_or_else(|| PathBuf::from(DEFAULT_EXTERNAL_FILES_DIR));
        let debug = match env::var(DEBUG_VAR) {
            Ok(v) => parse_flag(DEBUG_VAR, &v)?,
            Err(_) => false,
        };
        Ok(Self { external_files_dir, debug })
    }

    pub fn with_external_files_dir(dir: impl AsRef<Path>) -> Self {
        Self { external_files_dir: dir.as_ref().to_path_buf(),
               ..Self::default() }
    }

    /// Destino sugerido para la descarga. El subsistema de descargas puede
    /// elegir otra ruta si ésta ya existe.
    pub fn download_destination(&self) -> PathBuf {
        self.external_files_dir.join(DOWNLOAD_CACHE_DIR).join(DOWNLOADED_APP_FILE)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue { var,
                                             value: raw.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_destination_is_under_download_cache() {
        let cfg = ProvisioningConfig::with_external_files_dir("/data/ext");
        assert_eq!(cfg.download_destination(),
                   PathBuf::from("/data/ext/download_cache/managed_provisioning_downloaded_app.apk"));
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag(DEBUG_VAR, "1"), Ok(true));
        assert_eq!(parse_flag(DEBUG_VAR, " TRUE "), Ok(true));
        assert_eq!(parse_flag(DEBUG_VAR, "off"), Ok(false));
        assert!(matches!(parse_flag(DEBUG_VAR, "maybe"), Err(ConfigError::InvalidValue { .. })));
    }
}
