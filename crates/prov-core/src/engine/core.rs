//! Core runner implementation

use log::{debug, error, info, warn};
use prov_domain::UserId;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::{CancellationHandle, CancellationSignal, EngineBuilder, PipelineResult};
use crate::errors::CoreEngineError;
use crate::event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
use crate::metrics::{InMemoryMetrics, MetricsSink};
use crate::task::{ProvisioningTask, TaskErrorKind, TaskInput, TaskOutcome, TaskReporter, TaskStatus};

const PROGRESS_CAPACITY: usize = 64;

/// Runner del pipeline de aprovisionamiento.
///
/// Ejecuta los pasos estrictamente en orden; cada `run` empieza sólo cuando
/// el anterior reportó `Success`. Ante el primer error (o una cancelación)
/// deja de avanzar, invoca `clean_up` sobre los pasos iniciados en orden
/// inverso y publica el resultado. Tras completar también limpia, porque
/// todo paso iniciado debe liberar lo adquirido.
pub struct ProvisioningEngine<E = InMemoryEventStore, M = InMemoryMetrics>
    where E: EventStore,
          M: MetricsSink
{
    tasks: Vec<Box<dyn ProvisioningTask>>,
    statuses: Vec<TaskStatus>,
    event_store: E,
    metrics: M,
    run_id: Uuid,
    progress: broadcast::Sender<PipelineEvent>,
    cancel_handle: CancellationHandle,
    cancellation: CancellationSignal,
    cancellation_logged: bool,
    ran: bool,
}

impl ProvisioningEngine<InMemoryEventStore, InMemoryMetrics> {
    /// Crea un builder con stores en memoria.
    #[inline]
    pub fn new() -> EngineBuilder<InMemoryEventStore, InMemoryMetrics> {
        EngineBuilder { event_store: InMemoryEventStore::default(),
                        metrics: InMemoryMetrics::default(),
                        tasks: Vec::new() }
    }
}

impl<E, M> ProvisioningEngine<E, M>
    where E: EventStore,
          M: MetricsSink
{
    /// Crea un builder con las stores proporcionadas.
    #[inline]
    pub fn builder(event_store: E, metrics: M) -> EngineBuilder<E, M> {
        EngineBuilder { event_store,
                        metrics,
                        tasks: Vec::new() }
    }

    pub(crate) fn new_with_stores(event_store: E, metrics: M, tasks: Vec<Box<dyn ProvisioningTask>>) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        let (cancel_handle, cancellation) = CancellationHandle::new();
        let statuses = vec![TaskStatus::Pending; tasks.len()];
        Self { tasks,
               statuses,
               event_store,
               metrics,
               run_id: Uuid::new_v4(),
               progress,
               cancel_handle,
               cancellation,
               cancellation_logged: false,
               ran: false }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Handle para cancelar desde otra tarea mientras `run` está en curso.
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel_handle.clone()
    }

    /// Suscripción a los eventos de progreso (consultivos).
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.progress.subscribe()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.event_store.list(self.run_id)
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    /// Ejecuta el pipeline completo para `user_id`. Sólo puede llamarse una vez.
    pub async fn run(&mut self, user_id: UserId) -> Result<PipelineResult, CoreEngineError> {
        if self.ran {
            return Err(CoreEngineError::AlreadyRan);
        }
        self.ran = true;
        info!("pipeline {}: starting {} steps for user {user_id}", self.run_id, self.tasks.len());
        self.emit(PipelineEventKind::PipelineStarted { step_count: self.tasks.len(),
                                                       user_id });

        let mut started: Vec<usize> = Vec::with_capacity(self.tasks.len());
        let mut package_location = None;
        let mut result = PipelineResult::Completed;

        for index in 0..self.tasks.len() {
            if self.cancellation.is_cancelled() {
                self.note_cancellation(Some(index));
                result = PipelineResult::Cancelled;
                break;
            }

            let step_id = self.tasks[index].id().to_string();
            self.statuses[index] = TaskStatus::Running;
            self.emit(PipelineEventKind::StepStarted { step_index: index,
                                                       step_id: step_id.clone() });
            debug!("pipeline {}: running {step_id}", self.run_id);

            let (reporter, outcome_rx) = TaskReporter::channel(step_id.clone());
            let input = TaskInput { user_id,
                                    package_location: package_location.clone(),
                                    cancellation: self.cancellation.clone() };
            started.push(index);
            self.tasks[index].run(input, reporter).await;

            let outcome = outcome_rx.await.unwrap_or_else(|_| {
                                              error!("pipeline {}: {step_id} finished without reporting an outcome", self.run_id);
                                              TaskOutcome::Error { kind: TaskErrorKind::Internal,
                                                                   message: Some("step dropped its reporter".into()) }
                                          });

            // cancelado mientras el paso corría: el resultado se descarta
            if self.cancellation.is_cancelled() {
                self.statuses[index] = TaskStatus::Discarded;
                debug!("pipeline {}: discarding outcome of {step_id} after cancellation", self.run_id);
                self.note_cancellation(None);
                result = PipelineResult::Cancelled;
                break;
            }

            match outcome {
                TaskOutcome::Success { package_location: published, elapsed } => {
                    self.statuses[index] = TaskStatus::Succeeded;
                    if let Some(elapsed) = elapsed {
                        let category = self.tasks[index].metrics_category();
                        self.metrics.record(&category, elapsed);
                    }
                    self.emit(PipelineEventKind::StepSucceeded { step_index: index,
                                                                 step_id: step_id.clone(),
                                                                 package_location: published.as_ref().map(|p| p.display().to_string()),
                                                                 elapsed_ms: elapsed.map(|d| d.as_millis() as u64) });
                    if published.is_some() {
                        package_location = published;
                    }
                }
                TaskOutcome::Error { kind, message } => {
                    self.statuses[index] = TaskStatus::Failed;
                    warn!("pipeline {}: {step_id} failed: {kind} ({:?})", self.run_id, message);
                    self.emit(PipelineEventKind::StepFailed { step_index: index,
                                                              step_id: step_id.clone(),
                                                              kind,
                                                              message: message.clone() });
                    result = PipelineResult::Failed { step_id, kind, message };
                    break;
                }
            }
        }

        for status in self.statuses.iter_mut().filter(|s| **s == TaskStatus::Pending) {
            *status = TaskStatus::Skipped;
        }

        self.clean_up_started(&started).await;

        let terminal = match &result {
            PipelineResult::Completed => PipelineEventKind::PipelineCompleted,
            PipelineResult::Failed { step_id, kind, .. } => PipelineEventKind::PipelineFailed { step_id: step_id.clone(),
                                                                                                 kind: *kind },
            PipelineResult::Cancelled => PipelineEventKind::PipelineCancelled,
        };
        self.emit(terminal);
        info!("pipeline {}: finished with {:?}", self.run_id, result);
        Ok(result)
    }

    /// Limpieza en orden inverso de inicio. Los errores se registran y se ignoran.
    async fn clean_up_started(&mut self, started: &[usize]) {
        for &index in started.iter().rev() {
            let step_id = self.tasks[index].id().to_string();
            let error = match self.tasks[index].clean_up().await {
                Ok(()) => None,
                Err(e) => {
                    warn!("pipeline {}: {e}", self.run_id);
                    Some(e.reason)
                }
            };
            self.emit(PipelineEventKind::CleanupPerformed { step_index: index,
                                                            step_id,
                                                            error });
        }
    }

    fn note_cancellation(&mut self, pending_index: Option<usize>) {
        if self.cancellation_logged {
            return;
        }
        self.cancellation_logged = true;
        let pending_step = pending_index.map(|i| self.tasks[i].id().to_string());
        info!("pipeline {}: cancellation requested", self.run_id);
        self.emit(PipelineEventKind::CancellationRequested { pending_step });
    }

    fn emit(&mut self, kind: PipelineEventKind) {
        let ev = self.event_store.append_kind(self.run_id, kind);
        // sin suscriptores el envío falla; el progreso es sólo consultivo
        let _ = self.progress.send(ev);
    }
}
