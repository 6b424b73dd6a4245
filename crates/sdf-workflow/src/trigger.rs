//! Trigger phase: pop one task and create its pipeline executions.

use std::sync::Arc;

use serde_json::{Map, json};
use tracing::{info, warn};

use sdf_config::WorkflowConfig;
use sdf_core::{ProvisionError, Result};

use crate::clients::{AssetCatalog, ExecutionClient, InputUploader, ObjectStore, PipelineClient};
use crate::model::{
    CheckPipelineTask, DataFabricTask, ExecutionDetail, MultiPipelineTask, NewExecution,
    PipelineDefinition, PipelineTask, SingleCsvTask, TriggerPipelineTask,
};

pub const DEFINITION_SUFFIX: &str = ".pipeline.json";
pub const INPUT_SUFFIX: &str = "/data.csv";
pub const DATA_FABRIC_CONNECTOR: &str = "sif-dataFabric-pipeline-input-connector";

/// Sort by priority descending and pop the last element.
///
/// The popped task therefore carries the smallest priority value; equal
/// priorities keep their input order reversed.
pub fn pop_next_task(mut tasks: Vec<PipelineTask>) -> Option<(PipelineTask, Vec<PipelineTask>)> {
    tasks.sort_by_key(|t| std::cmp::Reverse(t.priority()));
    let next = tasks.pop()?;
    Some((next, tasks))
}

/// Input file key for a definition key in a multi-file task.
///
/// Replaces the first occurrence of the definition suffix and of the definition
/// prefix, mirroring how the two folders are laid out side by side.
pub fn input_key_for(definition_key: &str, task: &MultiPipelineTask) -> String {
    definition_key
        .replacen(DEFINITION_SUFFIX, INPUT_SUFFIX, 1)
        .replacen(&task.sif_resources_prefix, &task.resources_prefix, 1)
}

/// Settings the trigger phase needs from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSettings {
    pub execution_expiration_secs: u64,
    pub domain_id: Option<String>,
    pub environment_id: Option<String>,
}

impl From<&WorkflowConfig> for TriggerSettings {
    fn from(cfg: &WorkflowConfig) -> Self {
        Self {
            execution_expiration_secs: cfg.execution_expiration_secs,
            domain_id: cfg.domain_id.clone(),
            environment_id: cfg.environment_id.clone(),
        }
    }
}

pub struct TriggerPhase {
    store: Arc<dyn ObjectStore>,
    pipelines: Arc<dyn PipelineClient>,
    executions: Arc<dyn ExecutionClient>,
    uploader: Arc<dyn InputUploader>,
    catalog: Option<Arc<dyn AssetCatalog>>,
    settings: TriggerSettings,
}

impl TriggerPhase {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        pipelines: Arc<dyn PipelineClient>,
        executions: Arc<dyn ExecutionClient>,
        uploader: Arc<dyn InputUploader>,
        settings: TriggerSettings,
    ) -> Self {
        Self {
            store,
            pipelines,
            executions,
            uploader,
            catalog: None,
            settings,
        }
    }

    /// Catalog used by data-fabric tasks.
    pub fn with_catalog(mut self, catalog: Arc<dyn AssetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Consume exactly one task and create its executions.
    ///
    /// A missing input file skips that file only. Any other error aborts the phase.
    pub async fn process(&self, event: TriggerPipelineTask) -> Result<CheckPipelineTask> {
        info!(callback_url = %event.callback_url, tasks = event.tasks.len(), "Trigger phase");
        let Some((task, remaining)) = pop_next_task(event.tasks) else {
            return Ok(CheckPipelineTask {
                callback_url: event.callback_url,
                tasks: Vec::new(),
                executions: Vec::new(),
                executions_count: 0,
            });
        };
        info!(kind = task.kind(), priority = task.priority(), remaining = remaining.len(), "Processing task");

        let executions = match &task {
            PipelineTask::DataFabric(t) => self.trigger_data_fabric(t).await?,
            PipelineTask::SingleCsv(t) => self.trigger_single(t).await?,
            PipelineTask::Multi(t) => self.trigger_multi(t).await?,
        };

        info!(executions = executions.len(), "Trigger phase done");
        Ok(CheckPipelineTask {
            callback_url: event.callback_url,
            tasks: remaining,
            executions_count: executions.len(),
            executions,
        })
    }

    async fn trigger_multi(&self, task: &MultiPipelineTask) -> Result<Vec<ExecutionDetail>> {
        let keys = self.store.list_keys(&task.sif_resources_prefix).await?;
        let mut executions = Vec::new();
        for definition_key in keys.iter().filter(|k| k.ends_with(DEFINITION_SUFFIX)) {
            let input_key = input_key_for(definition_key, task);
            if let Some(detail) = self.trigger_with_input(definition_key, &input_key).await? {
                executions.push(detail);
            }
        }
        Ok(executions)
    }

    async fn trigger_single(&self, task: &SingleCsvTask) -> Result<Vec<ExecutionDetail>> {
        Ok(self
            .trigger_with_input(&task.sif_resource_key, &task.resource_key)
            .await?
            .into_iter()
            .collect())
    }

    async fn trigger_data_fabric(&self, task: &DataFabricTask) -> Result<Vec<ExecutionDetail>> {
        let (Some(domain_id), Some(environment_id)) =
            (&self.settings.domain_id, &self.settings.environment_id)
        else {
            return Err(ProvisionError::configuration(
                "data-fabric tasks need workflow.domain_id and workflow.environment_id",
            ));
        };
        let catalog = self.catalog.as_ref().ok_or_else(|| {
            ProvisionError::configuration("data-fabric tasks need an asset catalog")
        })?;

        let listing_id = catalog
            .find_listing_id(domain_id, &task.resource_asset_name)
            .await?
            .ok_or_else(|| {
                ProvisionError::not_found(format!("asset listing for {}", task.resource_asset_name))
            })?;
        info!(asset = %task.resource_asset_name, listing_id = %listing_id, "Resolved asset listing");

        let mut overrides = Map::new();
        overrides.insert(
            DATA_FABRIC_CONNECTOR.to_string(),
            json!({
                "parameters": {
                    "domainId": domain_id,
                    "environmentId": environment_id,
                    "assetListingId": listing_id,
                }
            }),
        );

        let Some(pipeline_id) = self.resolve_pipeline(&task.sif_resource_key).await? else {
            return Ok(Vec::new());
        };
        let execution = self
            .executions
            .create_execution(
                &pipeline_id,
                &NewExecution::job(self.settings.execution_expiration_secs, Some(overrides)),
            )
            .await?;
        Ok(vec![ExecutionDetail {
            pipeline_id,
            id: execution.id,
        }])
    }

    /// Look up the pipeline named by the definition at `definition_key`.
    async fn resolve_pipeline(&self, definition_key: &str) -> Result<Option<String>> {
        let raw = self.store.get_text(definition_key).await?;
        let definition: PipelineDefinition = serde_json::from_str(&raw)?;
        match self.pipelines.find_by_alias(&definition.name).await? {
            Some(pipeline) => Ok(Some(pipeline.id)),
            None => {
                warn!(pipeline = %definition.name, definition_key, "Pipeline not found, skipping");
                Ok(None)
            }
        }
    }

    async fn trigger_with_input(&self, definition_key: &str, input_key: &str) -> Result<Option<ExecutionDetail>> {
        info!(definition_key, input_key, "Creating pipeline execution");
        let Some(pipeline_id) = self.resolve_pipeline(definition_key).await? else {
            return Ok(None);
        };

        let content = match self.store.get_text(input_key).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                info!(input_key, "Input file does not exist, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let execution = self
            .executions
            .create_execution(
                &pipeline_id,
                &NewExecution::job(self.settings.execution_expiration_secs, None),
            )
            .await?;
        let upload_url = execution.input_upload_url.as_deref().ok_or_else(|| {
            ProvisionError::remote(
                "CreateExecution",
                sdf_core::ErrorKind::Internal,
                format!("execution {} has no input upload url", execution.id),
            )
        })?;
        self.uploader.upload_csv(upload_url, content).await?;

        Ok(Some(ExecutionDetail {
            pipeline_id,
            id: execution.id,
        }))
    }
}
