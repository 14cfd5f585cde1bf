//! Descriptor de la descarga del paquete de administración.
//!
//! Las dos sumas de verificación del request (paquete y firma) se reducen a
//! una sola variante `ChecksumSpec`: la del paquete tiene precedencia y la de
//! firma sólo se usa cuando la primera viene vacía.
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Suma esperada del artefacto descargado (SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "digest")]
pub enum ChecksumSpec {
    /// Hash del archivo completo.
    #[serde(with = "hex")]
    PackageHash(Vec<u8>),
    /// Hash de cualquiera de las firmas embebidas en el archivo.
    #[serde(with = "hex")]
    SignatureHash(Vec<u8>),
}

impl ChecksumSpec {
    /// Resuelve la precedencia entre ambas sumas. Error si las dos están vacías.
    pub fn from_parts(package_checksum: &[u8], signature_checksum: &[u8]) -> Result<Self, DomainError> {
        if !package_checksum.is_empty() {
            Ok(Self::PackageHash(package_checksum.to_vec()))
        } else if !signature_checksum.is_empty() {
            Ok(Self::SignatureHash(signature_checksum.to_vec()))
        } else {
            Err(DomainError::ValidationError("at least one of package checksum or signature checksum must be provided".into()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDownloadInfo {
    location: String,
    min_version: Option<u64>,
    cookie_header: Option<String>,
    checksum: ChecksumSpec,
}

impl PackageDownloadInfo {
    pub fn builder() -> PackageDownloadInfoBuilder {
        PackageDownloadInfoBuilder::default()
    }

    /// URL absoluta del archivo a descargar.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn min_version(&self) -> Option<u64> {
        self.min_version
    }

    /// Versión mínima efectiva: sin valor explícito cualquier versión
    /// instalada se considera desactualizada y se descarga siempre.
    pub fn effective_min_version(&self) -> u64 {
        self.min_version.unwrap_or(u64::MAX)
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    pub fn checksum(&self) -> &ChecksumSpec {
        &self.checksum
    }
}

#[derive(Debug, Default, Clone)]
pub struct PackageDownloadInfoBuilder {
    location: Option<String>,
    min_version: Option<u64>,
    cookie_header: Option<String>,
    package_checksum: Vec<u8>,
    signature_checksum: Vec<u8>,
}

impl PackageDownloadInfoBuilder {
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn min_version(mut self, min_version: u64) -> Self {
        self.min_version = Some(min_version);
        self
    }

    pub fn cookie_header(mut self, cookie_header: impl Into<String>) -> Self {
        self.cookie_header = Some(cookie_header.into());
        self
    }

    pub fn package_checksum(mut self, checksum: impl Into<Vec<u8>>) -> Self {
        self.package_checksum = checksum.into();
        self
    }

    pub fn signature_checksum(mut self, checksum: impl Into<Vec<u8>>) -> Self {
        self.signature_checksum = checksum.into();
        self
    }

    pub fn build(self) -> Result<PackageDownloadInfo, DomainError> {
        let location = self.location
                           .filter(|l| !l.trim().is_empty())
                           .ok_or_else(|| DomainError::ValidationError("download location must be non-empty".into()))?;
        if !is_absolute_url(&location) {
            return Err(DomainError::ValidationError(format!("download location '{location}' is not an absolute url")));
        }
        let checksum = ChecksumSpec::from_parts(&self.package_checksum, &self.signature_checksum)?;
        Ok(PackageDownloadInfo { location,
                                 min_version: self.min_version,
                                 cookie_header: self.cookie_header,
                                 checksum })
    }
}

/// `scheme://resto` con un esquema RFC 3986 y algo después del separador.
pub(crate) fn is_absolute_url(candidate: &str) -> bool {
    let Some((scheme, rest)) = candidate.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) && !rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_checksum_takes_precedence() {
        let info = PackageDownloadInfo::builder().location("https://example.com/dpc.apk")
                                                 .package_checksum(vec![1, 2, 3])
                                                 .signature_checksum(vec![9, 9])
                                                 .build()
                                                 .unwrap();
        assert_eq!(info.checksum(), &ChecksumSpec::PackageHash(vec![1, 2, 3]));
    }

    #[test]
    fn empty_package_checksum_falls_back_to_signature() {
        let spec = ChecksumSpec::from_parts(&[], b"abcd").unwrap();
        assert_eq!(spec, ChecksumSpec::SignatureHash(b"abcd".to_vec()));
    }

    #[test]
    fn both_checksums_empty_is_rejected() {
        let err = PackageDownloadInfo::builder().location("https://example.com/dpc.apk").build().unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn location_must_be_absolute() {
        assert!(is_absolute_url("http://www.some.uri.com"));
        assert!(is_absolute_url("file:///tmp/dpc.apk"));
        assert!(!is_absolute_url("www.some.uri.com/dpc.apk"));
        assert!(!is_absolute_url("1http://x"));
        assert!(!is_absolute_url("https://"));
        let err = PackageDownloadInfo::builder().location("relative/path.apk")
                                                .package_checksum(vec![1])
                                                .build()
                                                .unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn missing_min_version_always_requires_download() {
        let info = PackageDownloadInfo::builder().location("https://example.com/dpc.apk")
                                                 .package_checksum(vec![1])
                                                 .build()
                                                 .unwrap();
        assert_eq!(info.min_version(), None);
        assert_eq!(info.effective_min_version(), u64::MAX);
    }

    #[test]
    fn checksum_serializes_as_hex() {
        let v = serde_json::to_value(ChecksumSpec::PackageHash(vec![0xab, 0x01])).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "PackageHash", "digest": "ab01"}));
    }
}
