//! Hash helpers: SHA-256 sobre archivos (en streaming) y sobre byte arrays.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::warn;
use sha2::{Digest, Sha256};

pub const SHA256_LEN: usize = 32;

const READ_CHUNK: usize = 64 * 1024;

/// SHA-256 del contenido de `path`. `None` si el archivo no se puede leer.
pub fn compute_hash_of_file(path: &Path) -> Option<Vec<u8>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("could not open {} for hashing: {e}", path.display());
            return None;
        }
    };
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) => {
                warn!("read error while hashing {}: {e}", path.display());
                return None;
            }
        }
    }
    Some(hasher.finalize().to_vec())
}

/// SHA-256 de un byte array.
pub fn compute_hash_of_byte_array(bytes: &[u8]) -> Option<Vec<u8>> {
    Some(Sha256::digest(bytes).to_vec())
}

/// Representación hex (minúsculas) para logs.
pub fn hash_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}

/// Capacidad de hashing usada por los pasos. Permite sustituir el cálculo
/// real por uno programado en tests.
pub trait Digester: Send + Sync {
    fn hash_file(&self, path: &Path) -> Option<Vec<u8>>;
    fn hash_bytes(&self, bytes: &[u8]) -> Option<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn hash_file(&self, path: &Path) -> Option<Vec<u8>> {
        compute_hash_of_file(path)
    }

    fn hash_bytes(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        compute_hash_of_byte_array(bytes)
    }
}
