use subtle::ConstantTimeEq;

/// Igualdad de slices en tiempo constante respecto al contenido. Longitudes
/// distintas devuelven `false` sin inspeccionar los bytes.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
