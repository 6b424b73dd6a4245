//! Redshift provisioning primitives: statement execution with polling, IAM role
//! reconciliation for serverless namespaces, and user credential secrets.

pub mod aws;
pub mod data_api;
pub mod iam_roles;
pub mod namespace;
pub mod secrets;
pub mod target;
pub mod waiter;

pub use data_api::{
    QueryClientFactory, QueryExecutionClient, QueryStatus, StatementDescription, StatementFailure,
};
pub use iam_roles::{
    ApplyStatus, IamRoleAssociation, ReconciliationPlan, RoleChange, active_role_arns, compute_plan,
};
pub use namespace::{
    NamespaceClient, NamespaceState, ReconciliationOutcome, RoleSetReconciler, convergence_rounds,
};
pub use secrets::{CredentialSecretStore, SecretWrite, SecretsClient, UserCredential};
pub use target::{ProvisionedRedshiftProps, QueryTarget, ServerlessRedshiftProps};
pub use waiter::{StatementExecutionWaiter, WaitOptions, WaitOutcome};
