//! In-process rendition of the state machine's trigger/check loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use sdf_config::WorkflowConfig;
use sdf_core::{ProvisionError, Result, Sleeper};

use crate::callback::CallbackService;
use crate::check::CheckPhase;
use crate::model::{CallbackBody, CheckPipelineTask, TerminationEvent, TriggerPipelineTask};
use crate::trigger::TriggerPhase;

/// Error name reported to the observer when the loop aborts.
pub const LOOP_FAILED: &str = "WorkflowFailed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub rounds: usize,
    pub executions: usize,
    pub check_rounds: u32,
}

pub struct WorkflowDriver {
    trigger: TriggerPhase,
    check: CheckPhase,
    callback: CallbackService,
    sleeper: Arc<dyn Sleeper>,
    check_interval: Duration,
    max_check_rounds: Option<u32>,
}

impl WorkflowDriver {
    pub fn new(
        trigger: TriggerPhase,
        check: CheckPhase,
        callback: CallbackService,
        sleeper: Arc<dyn Sleeper>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            trigger,
            check,
            callback,
            sleeper,
            check_interval: config.check_interval(),
            max_check_rounds: config.max_check_rounds,
        }
    }

    /// Run every task to completion, then signal the callback URL.
    ///
    /// On failure the callback receives FAILURE with the error as cause, and the
    /// error is still returned.
    pub async fn run(&self, input: TriggerPipelineTask) -> Result<(WorkflowSummary, CallbackBody)> {
        let callback_url = input.callback_url.clone();
        match self.drive(input).await {
            Ok(summary) => {
                info!(?summary, "Workflow finished");
                let body = self
                    .callback
                    .notify(&TerminationEvent::succeeded(&callback_url))
                    .await?;
                Ok((summary, body))
            }
            Err(e) => {
                error!(error = %e, "Workflow failed");
                let event = TerminationEvent::failed(&callback_url, LOOP_FAILED, e.to_string());
                if let Err(notify_error) = self.callback.notify(&event).await {
                    error!(error = %notify_error, "Failure callback could not be delivered");
                }
                Err(e)
            }
        }
    }

    async fn drive(&self, mut input: TriggerPipelineTask) -> Result<WorkflowSummary> {
        let mut summary = WorkflowSummary {
            rounds: 0,
            executions: 0,
            check_rounds: 0,
        };
        while !input.tasks.is_empty() {
            let checked = self.trigger.process(input).await?;
            summary.rounds += 1;
            summary.executions += checked.executions_count;
            if !checked.executions.is_empty() {
                summary.check_rounds += self.wait_until_done(&checked).await?;
            }
            input = checked.next_trigger();
        }
        Ok(summary)
    }

    async fn wait_until_done(&self, task: &CheckPipelineTask) -> Result<u32> {
        let mut rounds = 0;
        loop {
            self.sleeper.sleep(self.check_interval).await;
            rounds += 1;
            let outcome = self.check.process(task.clone()).await?;
            if outcome.done {
                return Ok(rounds);
            }
            if let Some(max) = self.max_check_rounds
                && rounds >= max
            {
                return Err(ProvisionError::timeout(
                    format!("{} pipeline executions", task.executions.len()),
                    self.check_interval.as_secs() * u64::from(rounds),
                ));
            }
        }
    }
}
