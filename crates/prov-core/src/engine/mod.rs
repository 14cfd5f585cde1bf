//! Engine module: runner secuencial del pipeline de aprovisionamiento.
//!
//! Provides the core runner, its builder, cancellation handles and the
//! terminal `PipelineResult`.

pub mod builder;
pub mod cancel;
pub mod core;
pub mod result;

pub use builder::EngineBuilder;
pub use cancel::{CancellationHandle, CancellationSignal};
pub use core::ProvisioningEngine;
pub use result::PipelineResult;
