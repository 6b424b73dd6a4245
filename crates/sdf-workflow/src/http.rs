//! HTTP adapters: pipeline processor API, pre-signed uploads and callbacks.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use sdf_core::{ErrorKind, ProvisionError, Result};

use crate::clients::{CallbackNotifier, ExecutionClient, InputUploader, PipelineClient};
use crate::model::{CallbackBody, Execution, NewExecution, PipelineSummary};

const GROUP_CONTEXT_HEADER: &str = "x-groupcontextid";
const ROOT_GROUP: &str = "/";

fn transport_error(operation: &str, error: reqwest::Error) -> ProvisionError {
    ProvisionError::remote(operation, ErrorKind::RemoteFailure, error.to_string())
}

fn status_kind(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::AlreadyExists,
        _ => ErrorKind::RemoteFailure,
    }
}

/// Pass successful responses through; turn the rest into errors carrying the body.
async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProvisionError::remote(
        operation,
        status_kind(status),
        format!("HTTP {status}: {body}"),
    ))
}

#[derive(Debug, Deserialize)]
struct PipelineList {
    #[serde(default)]
    pipelines: Vec<PipelineSummary>,
}

/// Client for the pipeline processor REST API.
#[derive(Debug, Clone)]
pub struct PipelineApiClient {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl PipelineApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(GROUP_CONTEXT_HEADER, ROOT_GROUP);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait]
impl PipelineClient for PipelineApiClient {
    async fn find_by_alias(&self, name: &str) -> Result<Option<PipelineSummary>> {
        debug!(name, "Looking up pipeline");
        let response = self
            .request(reqwest::Method::GET, "/pipelines")
            .query(&[("name", name), ("verbose", "true")])
            .send()
            .await
            .map_err(|e| transport_error("ListPipelines", e))?;
        let list: PipelineList = ensure_success("ListPipelines", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("ListPipelines", e))?;
        Ok(list.pipelines.into_iter().next())
    }
}

#[async_trait]
impl ExecutionClient for PipelineApiClient {
    async fn create_execution(&self, pipeline_id: &str, request: &NewExecution) -> Result<Execution> {
        let response = self
            .request(reqwest::Method::POST, &format!("/pipelines/{pipeline_id}/executions"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("CreateExecution", e))?;
        ensure_success("CreateExecution", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("CreateExecution", e))
    }

    async fn get_execution(&self, pipeline_id: &str, execution_id: &str) -> Result<Execution> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/pipelines/{pipeline_id}/executions/{execution_id}"),
            )
            .send()
            .await
            .map_err(|e| transport_error("GetExecution", e))?;
        ensure_success("GetExecution", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("GetExecution", e))
    }
}

/// Plain PUTs to pre-signed upload targets and callback URLs.
#[derive(Debug, Clone, Default)]
pub struct HttpTransfer {
    http_client: Client,
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InputUploader for HttpTransfer {
    async fn upload_csv(&self, url: &str, content: String) -> Result<()> {
        let response = self
            .http_client
            .put(url)
            .header("Content-Type", "text/csv")
            .body(content)
            .send()
            .await
            .map_err(|e| transport_error("UploadInput", e))?;
        ensure_success("UploadInput", response).await?;
        Ok(())
    }
}

#[async_trait]
impl CallbackNotifier for HttpTransfer {
    async fn notify(&self, url: &str, body: &CallbackBody) -> Result<()> {
        // The pre-signed callback URL is signed without a content type.
        let payload = serde_json::to_string(body)?;
        let response = self
            .http_client
            .put(url)
            .header("Content-Type", "")
            .body(payload)
            .send()
            .await
            .map_err(|e| transport_error("SendCallback", e))?;
        ensure_success("SendCallback", response).await?;
        Ok(())
    }
}
