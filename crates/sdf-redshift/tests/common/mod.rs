#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use sdf_core::{ErrorKind, ProvisionError, Result};
use sdf_redshift::{
    IamRoleAssociation, NamespaceClient, NamespaceState, QueryExecutionClient, QueryStatus,
    QueryTarget, SecretsClient, StatementDescription, StatementFailure,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Single(String),
    Batch(Vec<String>),
}

/// Query client replaying a scripted status sequence; the last status repeats.
pub struct ScriptedQueryClient {
    statuses: Mutex<VecDeque<QueryStatus>>,
    last: Mutex<QueryStatus>,
    failure: Option<StatementFailure>,
    pub submissions: Mutex<Vec<Submission>>,
    pub describes: Mutex<u32>,
}

impl ScriptedQueryClient {
    pub fn new(statuses: &[QueryStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            last: Mutex::new(QueryStatus::Submitted),
            failure: None,
            submissions: Mutex::new(Vec::new()),
            describes: Mutex::new(0),
        }
    }

    pub fn with_failure(mut self, kind: ErrorKind, message: &str) -> Self {
        self.failure = Some(StatementFailure {
            kind,
            message: message.to_string(),
        });
        self
    }

    pub fn describe_count(&self) -> u32 {
        *self.describes.lock().unwrap()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutionClient for ScriptedQueryClient {
    async fn submit_single(&self, sql: &str, _target: &QueryTarget) -> Result<String> {
        self.submissions
            .lock()
            .unwrap()
            .push(Submission::Single(sql.to_string()));
        Ok("query-single".to_string())
    }

    async fn submit_batch(&self, sqls: &[String], _target: &QueryTarget) -> Result<String> {
        self.submissions
            .lock()
            .unwrap()
            .push(Submission::Batch(sqls.to_vec()));
        Ok("query-batch".to_string())
    }

    async fn describe(&self, query_id: &str) -> Result<StatementDescription> {
        *self.describes.lock().unwrap() += 1;
        let status = match self.statuses.lock().unwrap().pop_front() {
            Some(next) => {
                *self.last.lock().unwrap() = next;
                next
            }
            None => *self.last.lock().unwrap(),
        };
        let failure = match status {
            QueryStatus::Failed | QueryStatus::Aborted => self.failure.clone(),
            _ => None,
        };
        Ok(StatementDescription {
            id: query_id.to_string(),
            status,
            failure,
            query_string: "CREATE USER bi PASSWORD 'Secret123'".to_string(),
        })
    }
}

pub fn serverless_target() -> QueryTarget {
    QueryTarget::Serverless {
        workgroup_name: "sdf-wg".to_string(),
        database: "dev".to_string(),
    }
}

/// Namespace whose roles report `adding` for a number of reads after an update.
pub struct FakeNamespace {
    pub state: Mutex<NamespaceState>,
    pub reads_until_in_sync: Mutex<Option<u32>>,
    pub updates: Mutex<Vec<(Vec<String>, String)>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeNamespace {
    pub fn new(roles: &[IamRoleAssociation], default_role: Option<&str>) -> Self {
        Self {
            state: Mutex::new(NamespaceState {
                name: "sdf-ns".to_string(),
                iam_roles: roles.to_vec(),
                default_iam_role_arn: default_role.map(String::from),
            }),
            reads_until_in_sync: Mutex::new(Some(0)),
            updates: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `None` keeps roles in `adding` forever.
    pub fn converging_after(self, reads: Option<u32>) -> Self {
        *self.reads_until_in_sync.lock().unwrap() = reads;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NamespaceClient for FakeNamespace {
    async fn namespace_for_workgroup(&self, _workgroup_name: &str) -> Result<String> {
        self.calls.lock().unwrap().push("get_workgroup");
        Ok(self.state.lock().unwrap().name.clone())
    }

    async fn get_namespace(&self, _namespace_name: &str) -> Result<NamespaceState> {
        self.calls.lock().unwrap().push("get_namespace");
        let mut state = self.state.lock().unwrap().clone();
        let pending = !self.updates.lock().unwrap().is_empty();
        if pending {
            let mut remaining = self.reads_until_in_sync.lock().unwrap();
            let in_sync = match remaining.as_mut() {
                Some(0) => true,
                Some(n) => {
                    *n -= 1;
                    false
                }
                None => false,
            };
            if !in_sync {
                for role in &mut state.iam_roles {
                    role.apply_status = sdf_redshift::ApplyStatus::Adding;
                }
            }
        }
        Ok(state)
    }

    async fn update_namespace(
        &self,
        _namespace_name: &str,
        iam_roles: &[String],
        default_iam_role_arn: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push("update_namespace");
        self.updates
            .lock()
            .unwrap()
            .push((iam_roles.to_vec(), default_iam_role_arn.to_string()));
        let mut state = self.state.lock().unwrap();
        state.iam_roles = iam_roles
            .iter()
            .map(|r| IamRoleAssociation::new(r.clone(), sdf_redshift::ApplyStatus::InSync))
            .collect();
        state.default_iam_role_arn = Some(default_iam_role_arn.to_string());
        Ok(())
    }
}

/// In-memory secret store keyed by secret name.
#[derive(Default)]
pub struct InMemorySecrets {
    pub secrets: Mutex<BTreeMap<String, String>>,
    pub tags: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub describe_error: Option<ErrorKind>,
}

impl InMemorySecrets {
    pub fn with_secret(name: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .secrets
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        store
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretsClient for InMemorySecrets {
    async fn describe_secret(&self, secret_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push("describe");
        if let Some(kind) = self.describe_error {
            return Err(ProvisionError::remote("DescribeSecret", kind, "access denied"));
        }
        if self.secrets.lock().unwrap().contains_key(secret_id) {
            Ok(())
        } else {
            Err(ProvisionError::not_found(format!("secret {secret_id}")))
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

    async fn tag_secret(&self, secret_id: &str, tags: &BTreeMap<String, String>) -> Result<()> {
        self.calls.lock().unwrap().push("tag");
        self.tags
            .lock()
            .unwrap()
            .insert(secret_id.to_string(), tags.clone());
        Ok(())
    }

    async fn delete_secret(&self, secret_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push("delete");
        match self.secrets.lock().unwrap().remove(secret_id) {
            Some(_) => Ok(()),
            None => Err(ProvisionError::not_found(format!("secret {secret_id}"))),
        }
    }
}
