use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use prov_core::{CleanupError, MetricsCategory, ProvisioningTask, TaskErrorKind, TaskInput, TaskReporter};
use prov_domain::ProvisioningParams;

use crate::host::HostAction;

/// Paso terminal que delega en una acción opaca del anfitrión.
pub struct HostActionTask {
    id: String,
    action: Arc<dyn HostAction>,
    params: Arc<ProvisioningParams>,
}

impl HostActionTask {
    pub fn new(action: Arc<dyn HostAction>, params: Arc<ProvisioningParams>) -> Self {
        Self { id: action.name().to_string(),
               action,
               params }
    }
}

#[async_trait]
impl ProvisioningTask for HostActionTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn metrics_category(&self) -> MetricsCategory {
        MetricsCategory::HostActionTaskMs(self.id.clone())
    }

    async fn run(&mut self, input: TaskInput, mut reporter: TaskReporter) {
        match self.action.perform(&self.params, input.user_id).await {
            Ok(()) => {
                info!("{} done for user {}", self.id, input.user_id);
                reporter.stop_timer();
                reporter.success();
            }
            Err(e) => {
                error!("{} failed: {e}", self.id);
                reporter.error_with_message(TaskErrorKind::HostActionFailed, e.to_string());
            }
        }
    }

    async fn clean_up(&mut self) -> Result<(), CleanupError> {
        Ok(())
    }
}
