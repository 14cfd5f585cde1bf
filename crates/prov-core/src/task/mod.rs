//! Contrato común de los pasos del pipeline.
//!
//! Un paso (`ProvisioningTask`) recibe un `TaskInput` y un `TaskReporter`
//! propio. El reporter se consume al emitir el resultado, por lo que cada
//! invocación de `run` produce a lo sumo un `TaskOutcome`; el runner trata la
//! ausencia de resultado como error interno.

mod definition;
mod outcome;
mod reporter;
mod status;

pub use definition::{ProvisioningTask, TaskInput};
pub use outcome::{TaskErrorKind, TaskOutcome};
pub use reporter::{TaskReporter, TaskTimer};
pub use status::TaskStatus;
