use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::types::Tag;

use sdf_core::Result;

use super::sdk_error;
use crate::secrets::SecretsClient;

/// Secrets Manager API.
#[derive(Debug, Clone)]
pub struct SecretsManagerClient {
    client: Client,
}

impl SecretsManagerClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretsClient for SecretsManagerClient {
    async fn describe_secret(&self, secret_id: &str) -> Result<()> {
        self.client
            .describe_secret()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeSecret", e))?;
        Ok(())
    }

    async fn create_secret(&self, name: &str, secret_string: &str, description: &str) -> Result<()> {
        self.client
            .create_secret()
            .name(name)
            .secret_string(secret_string)
            .description(description)
            .send()
            .await
            .map_err(|e| sdk_error("CreateSecret", e))?;
        Ok(())
    }

    async fn update_secret(&self, secret_id: &str, secret_string: &str, description: &str) -> Result<()> {
        self.client
            .update_secret()
            .secret_id(secret_id)
            .secret_string(secret_string)
            .description(description)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateSecret", e))?;
        Ok(())
    }

    async fn tag_secret(&self, secret_id: &str, tags: &BTreeMap<String, String>) -> Result<()> {
        let tags = tags
            .iter()
            .map(|(k, v)| Tag::builder().key(k).value(v).build())
            .collect();
        self.client
            .tag_resource()
            .secret_id(secret_id)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| sdk_error("TagResource", e))?;
        Ok(())
    }

    async fn delete_secret(&self, secret_id: &str) -> Result<()> {
        self.client
            .delete_secret()
            .secret_id(secret_id)
            .force_delete_without_recovery(true)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteSecret", e))?;
        Ok(())
    }
}
