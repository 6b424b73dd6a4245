use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_sdk_redshiftdata::Client;
use tracing::debug;

use sdf_core::{ErrorKind, ProvisionError, Result};

use super::sdk_error;
use crate::data_api::{
    QueryClientFactory, QueryExecutionClient, QueryStatus, StatementDescription, StatementFailure,
};
use crate::target::QueryTarget;

/// Session name used when assuming the Data API role.
pub const DATA_API_SESSION_NAME: &str = "redshift-data-api";

const DATA_API_SESSION_LENGTH: Duration = Duration::from_secs(900);

/// Redshift Data API client.
#[derive(Debug, Clone)]
pub struct DataApiQueryClient {
    client: Client,
}

impl DataApiQueryClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn parse_status(raw: &str) -> QueryStatus {
    match raw {
        "FINISHED" => QueryStatus::Finished,
        "FAILED" => QueryStatus::Failed,
        "ABORTED" => QueryStatus::Aborted,
        "PICKED" | "STARTED" => QueryStatus::Running,
        _ => QueryStatus::Submitted,
    }
}

fn statement_id(operation: &str, id: Option<String>) -> Result<String> {
    id.filter(|id| !id.is_empty()).ok_or_else(|| {
        ProvisionError::remote(operation, ErrorKind::Internal, "response carried no statement id")
    })
}

#[async_trait]
impl QueryExecutionClient for DataApiQueryClient {
    async fn submit_single(&self, sql: &str, target: &QueryTarget) -> Result<String> {
        let request = self
            .client
            .execute_statement()
            .sql(sql)
            .database(target.database())
            .with_event(true);
        let request = match target {
            QueryTarget::Serverless { workgroup_name, .. } => request.workgroup_name(workgroup_name),
            QueryTarget::Provisioned {
                cluster_identifier,
                db_user,
                ..
            } => request.cluster_identifier(cluster_identifier).db_user(db_user),
        };
        let output = request
            .send()
            .await
            .map_err(|e| sdk_error("ExecuteStatement", e))?;
        statement_id("ExecuteStatement", output.id)
    }

    async fn submit_batch(&self, sqls: &[String], target: &QueryTarget) -> Result<String> {
        let request = self
            .client
            .batch_execute_statement()
            .set_sqls(Some(sqls.to_vec()))
            .database(target.database())
            .with_event(true);
        let request = match target {
            QueryTarget::Serverless { workgroup_name, .. } => request.workgroup_name(workgroup_name),
            QueryTarget::Provisioned {
                cluster_identifier,
                db_user,
                ..
            } => request.cluster_identifier(cluster_identifier).db_user(db_user),
        };
        let output = request
            .send()
            .await
            .map_err(|e| sdk_error("BatchExecuteStatement", e))?;
        statement_id("BatchExecuteStatement", output.id)
    }

    async fn describe(&self, query_id: &str) -> Result<StatementDescription> {
        let output = self
            .client
            .describe_statement()
            .id(query_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeStatement", e))?;

        let status = output
            .status
            .as_ref()
            .map(|s| parse_status(s.as_str()))
            .unwrap_or(QueryStatus::Submitted);
        let failure = output.error.map(|message| StatementFailure {
            kind: match ErrorKind::classify(None, &message) {
                ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
                _ => ErrorKind::RemoteFailure,
            },
            message,
        });

        Ok(StatementDescription {
            id: query_id.to_string(),
            status,
            failure,
            query_string: output.query_string.unwrap_or_default(),
        })
    }
}

/// Builds Data API clients with credentials from assuming the caller's role.
#[derive(Debug, Clone)]
pub struct AssumeRoleQueryClientFactory {
    sdk_config: SdkConfig,
}

impl AssumeRoleQueryClientFactory {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }
}

#[async_trait]
impl QueryClientFactory for AssumeRoleQueryClientFactory {
    async fn for_role(&self, role_arn: &str) -> Result<Arc<dyn QueryExecutionClient>> {
        debug!(role_arn, "Assuming Data API role");
        let provider = AssumeRoleProvider::builder(role_arn)
            .session_name(DATA_API_SESSION_NAME)
            .session_length(DATA_API_SESSION_LENGTH)
            .configure(&self.sdk_config)
            .build()
            .await;
        let config = aws_sdk_redshiftdata::config::Builder::from(&self.sdk_config)
            .credentials_provider(provider)
            .build();
        Ok(Arc::new(DataApiQueryClient::new(Client::from_conf(config))))
    }
}
