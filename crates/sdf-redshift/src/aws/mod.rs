//! AWS SDK implementations of the provider traits.
//!
//! SDK failures go through [`sdk_error`](sdf_core::sdk_error), so everything
//! leaving this module carries an [`ErrorKind`](sdf_core::ErrorKind).

mod data_api;
mod secrets;
mod serverless;

pub use data_api::{AssumeRoleQueryClientFactory, DATA_API_SESSION_NAME, DataApiQueryClient};
pub use secrets::SecretsManagerClient;
pub use serverless::ServerlessNamespaceClient;

pub(crate) use sdf_core::sdk_error;
