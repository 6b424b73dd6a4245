//! Credential secrets for warehouse users.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sdf_config::SecretsConfig;
use sdf_core::{Result, generate_password};

/// Length of generated warehouse user passwords.
pub const PASSWORD_LENGTH: usize = 32;

/// Username/password pair stored as the secret value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredential")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

/// Secret store control plane (Secrets Manager).
///
/// `describe_secret` must fail with a NotFound-kind error when the secret is absent.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    async fn describe_secret(&self, secret_id: &str) -> Result<()>;

    async fn create_secret(&self, name: &str, secret_string: &str, description: &str) -> Result<()>;

    async fn update_secret(&self, secret_id: &str, secret_string: &str, description: &str) -> Result<()>;

    async fn tag_secret(&self, secret_id: &str, tags: &BTreeMap<String, String>) -> Result<()>;

    /// Delete immediately, skipping the recovery window.
    async fn delete_secret(&self, secret_id: &str) -> Result<()>;
}

/// How [`CredentialSecretStore::upsert`] ended up writing the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretWrite {
    Created,
    Updated,
}

pub struct CredentialSecretStore {
    client: Arc<dyn SecretsClient>,
    description: String,
    tags: BTreeMap<String, String>,
}

impl CredentialSecretStore {
    pub fn new(client: Arc<dyn SecretsClient>, config: &SecretsConfig) -> Self {
        Self {
            client,
            description: config.description.clone(),
            tags: config.tags.clone(),
        }
    }

    /// Store a fresh credential for `username` under `secret_name`.
    ///
    /// An existing secret is updated in place; a missing one is created. Any other
    /// describe failure propagates.
    pub async fn upsert(&self, secret_name: &str, username: &str) -> Result<(UserCredential, SecretWrite)> {
        let credential = UserCredential {
            username: username.to_string(),
            password: generate_password(PASSWORD_LENGTH),
        };
        let secret_string = serde_json::to_string(&credential)?;

        let written = match self.client.describe_secret(secret_name).await {
            Ok(()) => {
                info!(secret = secret_name, username, "Updating credential of warehouse user");
                self.client
                    .update_secret(secret_name, &secret_string, &self.description)
                    .await?;
                SecretWrite::Updated
            }
            Err(e) if e.is_not_found() => {
                info!(secret = secret_name, username, "Creating credential of warehouse user");
                self.client
                    .create_secret(secret_name, &secret_string, &self.description)
                    .await?;
                SecretWrite::Created
            }
            Err(e) => return Err(e),
        };

        if !self.tags.is_empty() {
            self.client.tag_secret(secret_name, &self.tags).await?;
        }
        Ok((credential, written))
    }

    /// Force-delete the secret. An absent secret is not an error.
    pub async fn delete(&self, secret_name: &str) -> Result<()> {
        match self.client.delete_secret(secret_name).await {
            Ok(()) => {
                info!(secret = secret_name, "Deleted credential secret");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(secret = secret_name, "Credential secret already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
