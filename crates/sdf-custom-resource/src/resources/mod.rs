//! Warehouse resources routed by `ResourceType`.

mod copy;
mod iam_role;
mod schema;
mod sql;

pub use copy::{CopyS3DataProps, CopyS3DataResource};
pub use iam_role::{AssociateIamRoleProps, AssociateIamRoleResource};
pub use schema::{DatabaseSchemaProps, DatabaseSchemaResource};
pub use sql::{SqlProps, SqlResource};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use sdf_core::{ProvisionError, Result, Sleeper};
use sdf_redshift::{
    ProvisionedRedshiftProps, QueryClientFactory, QueryTarget, ServerlessRedshiftProps,
    StatementExecutionWaiter, WaitOptions,
};

/// Target properties shared by every warehouse resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedshiftTargetProps {
    #[serde(default)]
    pub serverless_redshift_props: Option<ServerlessRedshiftProps>,
    #[serde(default)]
    pub provisioned_redshift_props: Option<ProvisionedRedshiftProps>,
    /// Role for Data API calls when the serverless props do not carry one.
    #[serde(default, rename = "dataAPIRole")]
    pub data_api_role: Option<String>,
}

impl RedshiftTargetProps {
    pub fn target(&self) -> Result<QueryTarget> {
        QueryTarget::resolve(
            self.serverless_redshift_props.as_ref(),
            self.provisioned_redshift_props.as_ref(),
        )
    }

    pub fn data_api_role(&self) -> Result<&str> {
        self.data_api_role
            .as_deref()
            .or_else(|| {
                self.serverless_redshift_props
                    .as_ref()
                    .and_then(|s| s.data_api_role_arn.as_deref())
            })
            .ok_or_else(|| ProvisionError::configuration("no Data API role given for the Redshift target"))
    }
}

/// What statement-running resources need to build a waiter.
#[derive(Clone)]
pub struct StatementContext {
    factory: Arc<dyn QueryClientFactory>,
    sleeper: Arc<dyn Sleeper>,
    options: WaitOptions,
}

impl StatementContext {
    pub fn new(factory: Arc<dyn QueryClientFactory>, sleeper: Arc<dyn Sleeper>, options: WaitOptions) -> Self {
        Self {
            factory,
            sleeper,
            options,
        }
    }

    /// Resolve the target and a waiter bound to its Data API role.
    pub async fn prepare(&self, props: &RedshiftTargetProps) -> Result<(QueryTarget, StatementExecutionWaiter)> {
        let target = props.target()?;
        let client = self.factory.for_role(props.data_api_role()?).await?;
        Ok((
            target,
            StatementExecutionWaiter::new(client, self.sleeper.clone(), self.options),
        ))
    }
}
