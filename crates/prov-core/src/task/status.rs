use serde::{Deserialize, Serialize};

/// Estado de un paso dentro de una ejecución del pipeline.
///
/// Transiciones válidas:
/// - `Pending` -> `Running` -> `Succeeded` | `Failed`
/// - `Pending` -> `Skipped` (cancelación o fallo previo)
/// - `Running` -> `Discarded` (resultado llegado tras la cancelación)
///
/// La limpieza no cambia el estado; queda registrada como evento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
    Discarded,
}
