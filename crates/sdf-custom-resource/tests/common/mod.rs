#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use sdf_config::SecretsConfig;
use sdf_core::{ErrorKind, ProvisionError, RecordingSleeper, Result};
use sdf_custom_resource::{
    CustomResourceLifecycle, ResourceEvent, StatementContext, redshift_lifecycle,
};
use sdf_redshift::{
    ApplyStatus, CredentialSecretStore, IamRoleAssociation, NamespaceClient, NamespaceState,
    QueryClientFactory, QueryExecutionClient, QueryStatus, QueryTarget, RoleSetReconciler,
    SecretsClient, StatementDescription, StatementFailure, WaitOptions,
};

/// Warehouse fake: every submission finishes unless a rule marks it failed.
#[derive(Default)]
pub struct FakeWarehouse {
    /// (sql, database) per submission, batches flattened.
    pub executed: Mutex<Vec<(String, String)>>,
    /// Substring and kind; a submission containing it fails with that kind.
    pub fail_when: Mutex<Vec<(String, ErrorKind)>>,
    /// Fail with AlreadyExists on any statement seen before.
    pub reject_repeats: bool,
    pub roles: Mutex<Vec<String>>,
    last: Mutex<Option<(QueryStatus, Option<StatementFailure>, String)>>,
}

impl FakeWarehouse {
    /// Statements seen before fail with AlreadyExists, like a replayed Create.
    pub fn rejecting_repeats() -> Self {
        Self {
            reject_repeats: true,
            ..Self::default()
        }
    }

    pub fn fail_when(&self, needle: &str, kind: ErrorKind) {
        self.fail_when
            .lock()
            .unwrap()
            .push((needle.to_string(), kind));
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    fn record(&self, sqls: &[String], target: &QueryTarget) -> String {
        let mut executed = self.executed.lock().unwrap();
        let joined = sqls.join(";");
        let repeated = self.reject_repeats && executed.iter().any(|(sql, _)| sqls.contains(sql));
        let rule = self
            .fail_when
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| joined.contains(needle.as_str()))
            .map(|(_, kind)| *kind);
        let failure = match (rule, repeated) {
            (Some(kind), _) => Some(kind),
            (None, true) => Some(ErrorKind::AlreadyExists),
            (None, false) => None,
        };
        for sql in sqls {
            executed.push((sql.clone(), target.database().to_string()));
        }
        *self.last.lock().unwrap() = Some(match failure {
            Some(kind) => (
                QueryStatus::Failed,
                Some(StatementFailure {
                    kind,
                    message: format!("{kind} for {joined}"),
                }),
                joined,
            ),
            None => (QueryStatus::Finished, None, joined),
        });
        format!("q-{}", executed.len())
    }
}

#[async_trait]
impl QueryExecutionClient for FakeWarehouse {
    async fn submit_single(&self, sql: &str, target: &QueryTarget) -> Result<String> {
        Ok(self.record(&[sql.to_string()], target))
    }

    async fn submit_batch(&self, sqls: &[String], target: &QueryTarget) -> Result<String> {
        Ok(self.record(sqls, target))
    }

    async fn describe(&self, query_id: &str) -> Result<StatementDescription> {
        let (status, failure, query_string) = self
            .last
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProvisionError::not_found(query_id))?;
        Ok(StatementDescription {
            id: query_id.to_string(),
            status,
            failure,
            query_string,
        })
    }
}

pub struct FakeFactory(pub Arc<FakeWarehouse>);

#[async_trait]
impl QueryClientFactory for FakeFactory {
    async fn for_role(&self, role_arn: &str) -> Result<Arc<dyn QueryExecutionClient>> {
        self.0.roles.lock().unwrap().push(role_arn.to_string());
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct FakeSecrets {
    pub secrets: Mutex<BTreeMap<String, String>>,
    pub calls: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl SecretsClient for FakeSecrets {
    async fn describe_secret(&self, secret_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push("describe");
        if self.secrets.lock().unwrap().contains_key(secret_id) {
            Ok(())
        } else {
            Err(ProvisionError::not_found(secret_id))
        }
    }

    async fn create_secret(&self, name: &str, secret_string: &str, _description: &str) -> Result<()> {
        self.calls.lock().unwrap().push("create");
        self.secrets
            .lock()
            .unwrap()
            .insert(name.to_string(), secret_string.to_string());
        Ok(())
    }

    async fn update_secret(&self, secret_id: &str, secret_string: &str, _description: &str) -> Result<()> {
        self.calls.lock().unwrap().push("update");
        self.secrets
            .lock()
            .unwrap()
            .insert(secret_id.to_string(), secret_string.to_string());
        Ok(())
    }

    async fn tag_secret(&self, _secret_id: &str, _tags: &BTreeMap<String, String>) -> Result<()> {
        self.calls.lock().unwrap().push("tag");
        Ok(())
    }

    async fn delete_secret(&self, secret_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push("delete");
        match self.secrets.lock().unwrap().remove(secret_id) {
            Some(_) => Ok(()),
            None => Err(ProvisionError::not_found(secret_id)),
        }
    }
}

/// Namespace that applies updates immediately.
pub struct FakeNamespace {
    pub state: Mutex<NamespaceState>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeNamespace {
    pub fn new(roles: &[&str], default_role: Option<&str>) -> Self {
        Self {
            state: Mutex::new(NamespaceState {
                name: "sdf-ns".to_string(),
                iam_roles: roles
                    .iter()
                    .map(|r| IamRoleAssociation::new(*r, ApplyStatus::InSync))
                    .collect(),
                default_iam_role_arn: default_role.map(String::from),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn roles(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .iam_roles
            .iter()
            .map(|r| r.role_arn.clone())
            .collect()
    }
}

#[async_trait]
impl NamespaceClient for FakeNamespace {
    async fn namespace_for_workgroup(&self, _workgroup_name: &str) -> Result<String> {
        self.calls.lock().unwrap().push("get_workgroup");
        Ok("sdf-ns".to_string())
    }

    async fn get_namespace(&self, _namespace_name: &str) -> Result<NamespaceState> {
        self.calls.lock().unwrap().push("get_namespace");
        Ok(self.state.lock().unwrap().clone())
    }

    async fn update_namespace(
        &self,
        _namespace_name: &str,
        iam_roles: &[String],
        default_iam_role_arn: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push("update_namespace");
        let mut state = self.state.lock().unwrap();
        state.iam_roles = iam_roles
            .iter()
            .map(|r| IamRoleAssociation::new(r.clone(), ApplyStatus::InSync))
            .collect();
        state.default_iam_role_arn = Some(default_iam_role_arn.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub warehouse: Arc<FakeWarehouse>,
    pub secrets: Arc<FakeSecrets>,
    pub namespace: Arc<FakeNamespace>,
    pub lifecycle: CustomResourceLifecycle,
}

pub fn harness(warehouse: FakeWarehouse, suppress_all_errors: bool) -> Harness {
    let warehouse = Arc::new(warehouse);
    let secrets = Arc::new(FakeSecrets::default());
    let namespace = Arc::new(FakeNamespace::new(&["arn:role/admin"], Some("arn:role/admin")));
    let sleeper = Arc::new(RecordingSleeper::new());

    let statements = StatementContext::new(
        Arc::new(FakeFactory(warehouse.clone())),
        sleeper.clone(),
        WaitOptions::default(),
    );
    let reconciler = Arc::new(RoleSetReconciler::new(namespace.clone(), sleeper));
    let store = Arc::new(CredentialSecretStore::new(
        secrets.clone(),
        &SecretsConfig::default(),
    ));

    Harness {
        warehouse,
        secrets,
        namespace,
        lifecycle: redshift_lifecycle(statements, reconciler, store, 50, suppress_all_errors),
    }
}

pub fn serverless_props() -> Value {
    json!({
        "workgroupName": "sdf-wg",
        "databaseName": "dev",
        "dataAPIRoleArn": "arn:role/data-api"
    })
}

pub fn event(request_type: &str, resource_type: &str, properties: Value) -> ResourceEvent {
    serde_json::from_value(json!({
        "RequestType": request_type,
        "RequestId": "5a1c7e4e-request",
        "ResourceType": resource_type,
        "LogicalResourceId": "Resource",
        "ResourceProperties": properties,
        "ServiceToken": "arn:aws:lambda:us-east-1:111111111111:function:provider"
    }))
    .unwrap()
}
