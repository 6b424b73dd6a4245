use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_redshiftserverless::Client;

use sdf_core::{ErrorKind, ProvisionError, Result};

use super::sdk_error;
use crate::iam_roles::IamRoleAssociation;
use crate::namespace::{NamespaceClient, NamespaceState};

/// Redshift Serverless namespace and workgroup API.
#[derive(Debug, Clone)]
pub struct ServerlessNamespaceClient {
    client: Client,
}

impl ServerlessNamespaceClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NamespaceClient for ServerlessNamespaceClient {
    async fn namespace_for_workgroup(&self, workgroup_name: &str) -> Result<String> {
        let output = self
            .client
            .get_workgroup()
            .workgroup_name(workgroup_name)
            .send()
            .await
            .map_err(|e| sdk_error("GetWorkgroup", e))?;

        output
            .workgroup
            .and_then(|w| w.namespace_name)
            .ok_or_else(|| {
                ProvisionError::remote(
                    "GetWorkgroup",
                    ErrorKind::Internal,
                    format!("workgroup {workgroup_name} reported no namespace"),
                )
            })
    }

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceState> {
        let output = self
            .client
            .get_namespace()
            .namespace_name(namespace_name)
            .send()
            .await
            .map_err(|e| sdk_error("GetNamespace", e))?;

        let namespace = output.namespace.ok_or_else(|| {
            ProvisionError::remote(
                "GetNamespace",
                ErrorKind::Internal,
                format!("namespace {namespace_name} missing from response"),
            )
        })?;
        let iam_roles = namespace
            .iam_roles
            .unwrap_or_default()
            .iter()
            .map(|encoded| IamRoleAssociation::parse(encoded))
            .collect::<Result<Vec<_>>>()?;

        Ok(NamespaceState {
            name: namespace_name.to_string(),
            iam_roles,
            default_iam_role_arn: namespace.default_iam_role_arn.filter(|r| !r.is_empty()),
        })
    }

    async fn update_namespace(
        &self,
        namespace_name: &str,
        iam_roles: &[String],
        default_iam_role_arn: &str,
    ) -> Result<()> {
        // An empty default is sent as-is so a removed role stops being the default.
        self.client
            .update_namespace()
            .namespace_name(namespace_name)
            .set_iam_roles(Some(iam_roles.to_vec()))
            .default_iam_role_arn(default_iam_role_arn)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateNamespace", e))?;
        Ok(())
    }
}
