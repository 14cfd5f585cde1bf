//! Builder para `ProvisioningEngine`.
//!
//! ```ignore
//! let mut engine = ProvisioningEngine::new()
//!     .add_task(download)
//!     .add_task(verify)
//!     .build()?;
//! let result = engine.run(user_id).await?;
//! ```
use std::collections::HashSet;

use crate::engine::ProvisioningEngine;
use crate::errors::CoreEngineError;
use crate::event::EventStore;
use crate::metrics::MetricsSink;
use crate::task::ProvisioningTask;

/// Acumula las stores y la lista ordenada de pasos.
pub struct EngineBuilder<E: EventStore, M: MetricsSink> {
    pub(crate) event_store: E,
    pub(crate) metrics: M,
    pub(crate) tasks: Vec<Box<dyn ProvisioningTask>>,
}

impl<E: EventStore, M: MetricsSink> EngineBuilder<E, M> {
    /// Añade un paso al final del pipeline.
    #[inline]
    pub fn add_task<T>(mut self, task: T) -> Self
        where T: ProvisioningTask + 'static
    {
        self.tasks.push(Box::new(task));
        self
    }

    /// Añade pasos ya empaquetados (p.ej. producidos por una factoría).
    pub fn add_tasks(mut self, tasks: impl IntoIterator<Item = Box<dyn ProvisioningTask>>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Construye el engine. Rechaza pipelines vacíos e ids repetidos.
    pub fn build(self) -> Result<ProvisioningEngine<E, M>, CoreEngineError> {
        if self.tasks.is_empty() {
            return Err(CoreEngineError::EmptyPipeline);
        }
        let mut seen = HashSet::new();
        for t in &self.tasks {
            if !seen.insert(t.id().to_string()) {
                return Err(CoreEngineError::DuplicateStepId(t.id().to_string()));
            }
        }
        Ok(ProvisioningEngine::new_with_stores(self.event_store, self.metrics, self.tasks))
    }
}
