//! Signal the waiting observer once the loop terminates.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use sdf_core::{ProvisionError, Result};

use crate::clients::{CallbackNotifier, ExecutionInputSource};
use crate::model::{CallbackBody, CallbackStatus, TerminationEvent, TriggerPipelineTask};

/// Reason sent when the loop ended without a cause.
pub const DEFAULT_REASON: &str = "Done";

/// Build the signal body for a termination event.
pub fn callback_body(event: &TerminationEvent) -> CallbackBody {
    let status = if event.error.is_some() {
        CallbackStatus::Failure
    } else {
        CallbackStatus::Success
    };
    CallbackBody {
        status,
        reason: event
            .cause
            .clone()
            .unwrap_or_else(|| DEFAULT_REASON.to_string()),
        unique_id: Uuid::new_v4().to_string(),
    }
}

pub struct CallbackService {
    input_source: Option<Arc<dyn ExecutionInputSource>>,
    notifier: Arc<dyn CallbackNotifier>,
}

impl CallbackService {
    pub fn new(notifier: Arc<dyn CallbackNotifier>) -> Self {
        Self {
            input_source: None,
            notifier,
        }
    }

    /// Used to recover the callback URL from the state-machine execution input.
    pub fn with_input_source(mut self, source: Arc<dyn ExecutionInputSource>) -> Self {
        self.input_source = Some(source);
        self
    }

    async fn callback_url(&self, event: &TerminationEvent) -> Result<String> {
        if let Some(url) = &event.callback_url {
            return Ok(url.clone());
        }
        let execution = event.execution.as_ref().ok_or_else(|| {
            ProvisionError::invalid_properties("termination event names neither a callback url nor an execution")
        })?;
        let source = self.input_source.as_ref().ok_or_else(|| {
            ProvisionError::configuration("no execution input source to resolve the callback url")
        })?;
        let raw = source.execution_input(&execution.execution_id).await?;
        let input: TriggerPipelineTask = serde_json::from_str(&raw)?;
        Ok(input.callback_url)
    }

    pub async fn notify(&self, event: &TerminationEvent) -> Result<CallbackBody> {
        let url = self.callback_url(event).await?;
        let body = callback_body(event);
        info!(status = ?body.status, reason = %body.reason, "Sending callback");
        self.notifier.notify(&url, &body).await?;
        Ok(body)
    }
}
