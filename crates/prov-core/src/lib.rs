//! prov-core: motor secuencial de tareas de aprovisionamiento.
//!
//! Contiene el contrato común de cada paso (`ProvisioningTask`), el runner
//! (`ProvisioningEngine`) que los ejecuta en orden con limpieza inversa, los
//! eventos de progreso, las primitivas de integridad (SHA-256 y comparación
//! en tiempo constante), métricas y configuración.
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod metrics;
pub mod task;

pub use config::{ConfigError, ProvisioningConfig};
pub use engine::{CancellationHandle, CancellationSignal, EngineBuilder, PipelineResult, ProvisioningEngine};
pub use errors::{CleanupError, CoreEngineError};
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use hashing::{compute_hash_of_byte_array, compute_hash_of_file, constant_time_eq, hash_hex, Digester, Sha256Digester};
pub use metrics::{InMemoryMetrics, MetricsCategory, MetricsSink};
pub use task::{ProvisioningTask, TaskErrorKind, TaskInput, TaskOutcome, TaskReporter, TaskStatus, TaskTimer};
