//! Provider seams of the orchestrator.

use async_trait::async_trait;

use sdf_core::Result;

use crate::model::{CallbackBody, Execution, NewExecution, PipelineSummary};

/// Object storage holding pipeline definitions and input files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Fails with a NotFound-kind error for a missing key.
    async fn get_text(&self, key: &str) -> Result<String>;
}

#[async_trait]
pub trait PipelineClient: Send + Sync {
    async fn find_by_alias(&self, name: &str) -> Result<Option<PipelineSummary>>;
}

#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn create_execution(&self, pipeline_id: &str, request: &NewExecution) -> Result<Execution>;

    async fn get_execution(&self, pipeline_id: &str, execution_id: &str) -> Result<Execution>;
}

/// PUT of input content to a pre-signed upload target.
#[async_trait]
pub trait InputUploader: Send + Sync {
    async fn upload_csv(&self, url: &str, content: String) -> Result<()>;
}

/// Signal to an outside observer waiting on the provisioning run.
#[async_trait]
pub trait CallbackNotifier: Send + Sync {
    async fn notify(&self, url: &str, body: &CallbackBody) -> Result<()>;
}

#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Listing id of the first asset matching `asset_name`.
    async fn find_listing_id(&self, domain_id: &str, asset_name: &str) -> Result<Option<String>>;
}

/// Reads back the input a state-machine execution was started with.
#[async_trait]
pub trait ExecutionInputSource: Send + Sync {
    async fn execution_input(&self, execution_arn: &str) -> Result<String>;
}
