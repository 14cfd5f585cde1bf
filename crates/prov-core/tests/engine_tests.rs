use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prov_core::{CancellationHandle, CleanupError, CoreEngineError, MetricsCategory, PipelineEventKind, PipelineResult, ProvisioningEngine,
                ProvisioningTask, TaskErrorKind, TaskInput, TaskReporter, TaskStatus};

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
enum Behavior {
    Succeed,
    SucceedTimed,
    Publish(PathBuf),
    ExpectPackage(Option<PathBuf>),
    Fail(TaskErrorKind),
    DropReporter,
    Deferred,
}

struct ScriptedTask {
    id: &'static str,
    behavior: Behavior,
    journal: Journal,
    cleanup_fails: bool,
}

impl ScriptedTask {
    fn new(id: &'static str, behavior: Behavior, journal: &Journal) -> Self {
        Self { id,
               behavior,
               journal: journal.clone(),
               cleanup_fails: false }
    }
}

#[async_trait]
impl ProvisioningTask for ScriptedTask {
    fn id(&self) -> &str {
        self.id
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::HostActionTaskMs(self.id.to_string())
    }

    async fn run(&mut self, input: TaskInput, mut reporter: TaskReporter) {
        self.journal.lock().unwrap().push(format!("run:{}", self.id));
        match self.behavior.clone() {
            Behavior::Succeed => reporter.success(),
            Behavior::SucceedTimed => {
                reporter.stop_timer();
                reporter.success();
            }
            Behavior::Publish(path) => reporter.success_with_package(path),
            Behavior::ExpectPackage(expected) => {
                if input.package_location == expected {
                    reporter.success();
                } else {
                    reporter.error_with_message(TaskErrorKind::Internal, format!("got {:?}", input.package_location));
                }
            }
            Behavior::Fail(kind) => reporter.error(kind),
            Behavior::DropReporter => drop(reporter),
            Behavior::Deferred => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    reporter.success();
                });
            }
        }
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        self.journal.lock().unwrap().push(format!("cleanup:{}", self.id));
        if self.cleanup_fails {
            return Err(CleanupError::new(self.id, "disk busy"));
        }
        Ok(())
    }
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(j: &Journal) -> Vec<String> {
    j.lock().unwrap().clone()
}

#[tokio::test]
async fn completed_pipeline_runs_in_order_and_cleans_up_in_reverse() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("a", Behavior::Succeed, &j))
                                              .add_task(ScriptedTask::new("b", Behavior::Deferred, &j))
                                              .add_task(ScriptedTask::new("c", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();

    let result = engine.run(7).await.unwrap();

    assert_eq!(result, PipelineResult::Completed);
    assert_eq!(entries(&j), vec!["run:a", "run:b", "run:c", "cleanup:c", "cleanup:b", "cleanup:a"]);
    assert!(engine.statuses().iter().all(|s| *s == TaskStatus::Succeeded));
    let events = engine.events();
    assert!(matches!(events.first().map(|e| &e.kind), Some(PipelineEventKind::PipelineStarted { step_count: 3, user_id: 7 })));
    assert_eq!(events.last().map(|e| &e.kind), Some(&PipelineEventKind::PipelineCompleted));
}

#[tokio::test]
async fn first_error_stops_progression_and_cleans_started_steps() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("download", Behavior::Succeed, &j))
                                              .add_task(ScriptedTask::new("verify", Behavior::Fail(TaskErrorKind::HashMismatch), &j))
                                              .add_task(ScriptedTask::new("install", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();

    let result = engine.run(0).await.unwrap();

    assert_eq!(result.failure(), Some(("verify", TaskErrorKind::HashMismatch)));
    assert_eq!(entries(&j), vec!["run:download", "run:verify", "cleanup:verify", "cleanup:download"]);
    assert_eq!(engine.statuses(), &[TaskStatus::Succeeded, TaskStatus::Failed, TaskStatus::Skipped]);
    assert!(matches!(engine.events().last().map(|e| &e.kind),
                     Some(PipelineEventKind::PipelineFailed { step_id, kind: TaskErrorKind::HashMismatch }) if step_id == "verify"));
}

#[tokio::test]
async fn package_location_is_handed_to_following_steps() {
    let j = journal();
    let path = PathBuf::from("/local/filename");
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("first", Behavior::ExpectPackage(None), &j))
                                              .add_task(ScriptedTask::new("download", Behavior::Publish(path.clone()), &j))
                                              .add_task(ScriptedTask::new("verify", Behavior::ExpectPackage(Some(path.clone())), &j))
                                              .add_task(ScriptedTask::new("install", Behavior::ExpectPackage(Some(path)), &j))
                                              .build()
                                              .unwrap();

    assert_eq!(engine.run(0).await.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
async fn only_stopped_timers_are_recorded() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("untimed", Behavior::Succeed, &j))
                                              .add_task(ScriptedTask::new("timed", Behavior::SucceedTimed, &j))
                                              .add_task(ScriptedTask::new("broken", Behavior::Fail(TaskErrorKind::Other), &j))
                                              .build()
                                              .unwrap();

    engine.run(0).await.unwrap();

    assert_eq!(engine.metrics().categories(), vec![MetricsCategory::HostActionTaskMs("timed".into())]);
}

#[tokio::test]
async fn dropped_reporter_becomes_internal_failure() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("silent", Behavior::DropReporter, &j))
                                              .add_task(ScriptedTask::new("never", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();

    let result = engine.run(0).await.unwrap();

    assert_eq!(result.failure(), Some(("silent", TaskErrorKind::Internal)));
    assert_eq!(entries(&j), vec!["run:silent", "cleanup:silent"]);
}

#[tokio::test]
async fn cancellation_before_start_runs_nothing() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("a", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();
    engine.cancellation_handle().cancel();

    assert_eq!(engine.run(0).await.unwrap(), PipelineResult::Cancelled);
    assert!(entries(&j).is_empty());
    assert_eq!(engine.statuses(), &[TaskStatus::Skipped]);
    let kinds: Vec<_> = engine.events().into_iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&PipelineEventKind::CancellationRequested { pending_step: Some("a".into()) }));
    assert_eq!(kinds.last(), Some(&PipelineEventKind::PipelineCancelled));
}

/// Paso que cancela el pipeline mientras corre y luego reporta éxito igual.
struct Canceller {
    slot: Arc<Mutex<Option<CancellationHandle>>>,
    journal: Journal,
}

#[async_trait]
impl ProvisioningTask for Canceller {
    fn id(&self) -> &str {
        "canceller"
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::DownloadPackageTaskMs
    }

    async fn run(&mut self, input: TaskInput, mut reporter: TaskReporter) {
        self.journal.lock().unwrap().push("run:canceller".into());
        let handle = self.slot.lock().unwrap().clone().expect("handle installed");
        let mut signal = input.cancellation.clone();
        tokio::spawn(async move {
            handle.cancel();
            signal.cancelled().await;
            reporter.stop_timer();
            reporter.success();
        });
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        self.journal.lock().unwrap().push("cleanup:canceller".into());
        Ok(())
    }
}

#[tokio::test]
async fn cancellation_during_step_discards_outcome_and_cleans_up() {
    let j = journal();
    let slot = Arc::new(Mutex::new(None));
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("before", Behavior::Succeed, &j))
                                              .add_task(Canceller { slot: slot.clone(),
                                                                    journal: j.clone() })
                                              .add_task(ScriptedTask::new("after", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();
    *slot.lock().unwrap() = Some(engine.cancellation_handle());

    let result = engine.run(0).await.unwrap();

    assert_eq!(result, PipelineResult::Cancelled);
    assert_eq!(entries(&j), vec!["run:before", "run:canceller", "cleanup:canceller", "cleanup:before"]);
    assert_eq!(engine.statuses(), &[TaskStatus::Succeeded, TaskStatus::Discarded, TaskStatus::Skipped]);
    assert!(engine.events().iter().any(|e| e.kind == PipelineEventKind::CancellationRequested { pending_step: None }));
    // el éxito cronometrado llegó tarde: ni métrica ni StepSucceeded
    assert!(engine.metrics().categories().is_empty());
    assert!(!engine.events().iter().any(|e| matches!(&e.kind,
        PipelineEventKind::StepSucceeded { step_id, .. } if step_id == "canceller")));
}

#[tokio::test]
async fn cleanup_errors_are_swallowed() {
    let j = journal();
    let mut failing = ScriptedTask::new("a", Behavior::Succeed, &j);
    failing.cleanup_fails = true;
    let mut engine = ProvisioningEngine::new().add_task(failing)
                                              .add_task(ScriptedTask::new("b", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();

    assert_eq!(engine.run(0).await.unwrap(), PipelineResult::Completed);
    assert!(engine.events().iter().any(|e| matches!(&e.kind,
        PipelineEventKind::CleanupPerformed { step_id, error: Some(_), .. } if step_id == "a")));
}

#[tokio::test]
async fn progress_is_broadcast_to_subscribers() {
    let j = journal();
    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("a", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();
    let mut rx = engine.subscribe();

    engine.run(0).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        seen.push(ev.kind);
    }
    assert!(seen.contains(&PipelineEventKind::StepStarted { step_index: 0,
                                                            step_id: "a".into() }));
    assert_eq!(seen.last(), Some(&PipelineEventKind::PipelineCompleted));
}

#[tokio::test]
async fn misuse_is_rejected() {
    let j = journal();
    assert!(matches!(ProvisioningEngine::new().build(), Err(CoreEngineError::EmptyPipeline)));
    let dup = ProvisioningEngine::new().add_task(ScriptedTask::new("x", Behavior::Succeed, &j))
                                       .add_task(ScriptedTask::new("x", Behavior::Succeed, &j))
                                       .build();
    assert!(matches!(dup, Err(CoreEngineError::DuplicateStepId(id)) if id == "x"));

    let mut engine = ProvisioningEngine::new().add_task(ScriptedTask::new("x", Behavior::Succeed, &j))
                                              .build()
                                              .unwrap();
    engine.run(0).await.unwrap();
    assert_eq!(engine.run(0).await, Err(CoreEngineError::AlreadyRan));
}
