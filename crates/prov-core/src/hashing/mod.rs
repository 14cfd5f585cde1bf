//! Primitivas de integridad: SHA-256 de archivos y bytes, comparación en
//! tiempo constante y el trait `Digester` que las expone a los pasos.

pub mod ct;
pub mod digest;

pub use ct::constant_time_eq;
pub use digest::{compute_hash_of_byte_array, compute_hash_of_file, hash_hex, Digester, Sha256Digester, SHA256_LEN};
