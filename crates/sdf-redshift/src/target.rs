//! Where statements run: a serverless workgroup or a provisioned cluster.

use serde::{Deserialize, Serialize};

use sdf_core::{ProvisionError, Result};

/// Serverless warehouse properties as passed in resource properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessRedshiftProps {
    pub workgroup_name: String,
    pub database_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workgroup_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
    /// Role assumed for Data API calls
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "dataAPIRoleArn")]
    pub data_api_role_arn: Option<String>,
}

/// Legacy provisioned cluster properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedRedshiftProps {
    pub cluster_identifier: String,
    pub db_user: String,
    pub database_name: String,
}

/// Resolved execution target for a statement batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Serverless {
        workgroup_name: String,
        database: String,
    },
    Provisioned {
        cluster_identifier: String,
        db_user: String,
        database: String,
    },
}

impl QueryTarget {
    /// Pick the target from optional serverless/provisioned properties.
    ///
    /// Serverless wins when both are present. Neither is a configuration error.
    pub fn resolve(
        serverless: Option<&ServerlessRedshiftProps>,
        provisioned: Option<&ProvisionedRedshiftProps>,
    ) -> Result<Self> {
        match (serverless, provisioned) {
            (Some(s), _) => Ok(Self::Serverless {
                workgroup_name: s.workgroup_name.clone(),
                database: s.database_name.clone(),
            }),
            (None, Some(p)) => Ok(Self::Provisioned {
                cluster_identifier: p.cluster_identifier.clone(),
                db_user: p.db_user.clone(),
                database: p.database_name.clone(),
            }),
            (None, None) => Err(ProvisionError::configuration(
                "Can't identify the mode of the Redshift cluster: neither serverless nor provisioned properties were given",
            )),
        }
    }

    /// Same target, different database.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        let database = database.into();
        match self {
            Self::Serverless { workgroup_name, .. } => Self::Serverless {
                workgroup_name: workgroup_name.clone(),
                database,
            },
            Self::Provisioned {
                cluster_identifier,
                db_user,
                ..
            } => Self::Provisioned {
                cluster_identifier: cluster_identifier.clone(),
                db_user: db_user.clone(),
                database,
            },
        }
    }

    pub fn database(&self) -> &str {
        match self {
            Self::Serverless { database, .. } | Self::Provisioned { database, .. } => database,
        }
    }
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serverless {
                workgroup_name,
                database,
            } => write!(f, "{workgroup_name}.{database}"),
            Self::Provisioned {
                cluster_identifier,
                database,
                ..
            } => write!(f, "{cluster_identifier}.{database}"),
        }
    }
}
