//! IAM role associations of a serverless namespace and the pure plan computation.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use sdf_core::{ErrorKind, ProvisionError, Result};

static APPLY_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"applyStatus=([^,]+)[,)]").expect("Invalid applyStatus regex"));
static IAM_ROLE_ARN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iamRoleArn=([^,]+)[,)]").expect("Invalid iamRoleArn regex"));

/// Provider-reported per-role state during an association change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyStatus {
    InSync,
    Adding,
    Removing,
}

impl FromStr for ApplyStatus {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "in-sync" => Ok(Self::InSync),
            "adding" => Ok(Self::Adding),
            "removing" => Ok(Self::Removing),
            other => Err(ProvisionError::remote(
                "GetNamespace",
                ErrorKind::Internal,
                format!("unknown IAM role apply status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamRoleAssociation {
    pub role_arn: String,
    pub apply_status: ApplyStatus,
}

impl IamRoleAssociation {
    pub fn new(role_arn: impl Into<String>, apply_status: ApplyStatus) -> Self {
        Self {
            role_arn: role_arn.into(),
            apply_status,
        }
    }

    /// Decode the provider's `IamRole(applyStatus=..., iamRoleArn=...)` string.
    pub fn parse(encoded: &str) -> Result<Self> {
        let status = APPLY_STATUS
            .captures(encoded)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                ProvisionError::remote(
                    "GetNamespace",
                    ErrorKind::Internal,
                    format!("Invalid IamRole string ({encoded}), can not extract status."),
                )
            })?;
        let role = IAM_ROLE_ARN
            .captures(encoded)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                ProvisionError::remote(
                    "GetNamespace",
                    ErrorKind::Internal,
                    format!("Invalid IamRole string ({encoded}), can not extract role arn."),
                )
            })?;

        Ok(Self {
            role_arn: role.as_str().trim().to_string(),
            apply_status: status.as_str().parse()?,
        })
    }
}

/// Role ARNs that stay associated: everything not already being removed.
pub fn active_role_arns(associations: &[IamRoleAssociation]) -> Vec<String> {
    associations
        .iter()
        .filter(|a| a.apply_status != ApplyStatus::Removing)
        .map(|a| a.role_arn.clone())
        .collect()
}

/// One add and/or one remove applied to a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChange {
    pub to_add: Option<String>,
    pub to_remove: Option<String>,
}

/// Desired role list and default role for a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub roles: Vec<String>,
    /// Empty only when `roles` is empty.
    pub default_role: String,
}

/// Compute the next role set from the current one plus a single change.
///
/// A role both removed and added ends up present. The default is cleared if it is
/// being removed, then falls back to the added role, then to the first remaining role.
pub fn compute_plan(
    current_roles: &[String],
    change: &RoleChange,
    current_default: Option<&str>,
) -> ReconciliationPlan {
    let to_add = change.to_add.as_deref().filter(|r| !r.is_empty());
    let to_remove = change.to_remove.as_deref().filter(|r| !r.is_empty());

    let mut roles: Vec<String> = Vec::with_capacity(current_roles.len() + 1);
    for role in current_roles {
        if Some(role.as_str()) != to_remove && !roles.contains(role) {
            roles.push(role.clone());
        }
    }
    if let Some(add) = to_add
        && !roles.iter().any(|r| r == add)
    {
        roles.push(add.to_string());
    }

    let mut default_role = current_default.unwrap_or_default().to_string();
    if to_remove.is_some_and(|r| r == default_role) {
        default_role.clear();
    }
    if default_role.is_empty()
        && let Some(add) = to_add
    {
        default_role = add.to_string();
    }
    if default_role.is_empty()
        && let Some(first) = roles.first()
    {
        default_role = first.clone();
    }

    ReconciliationPlan {
        roles,
        default_role,
    }
}
