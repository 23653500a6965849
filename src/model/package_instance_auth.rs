use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::auth::{Auth, AuthInput};
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageInstanceAuthStatusCondition {
    /// Waiting for credentials
    Pending,
    Succeeded,
    Failed,
    /// Marked for deletion by the consumer
    Unused,
}

impl std::fmt::Display for PackageInstanceAuthStatusCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PackageInstanceAuthStatusCondition::Pending => write!(f, "PENDING"),
            PackageInstanceAuthStatusCondition::Succeeded => write!(f, "SUCCEEDED"),
            PackageInstanceAuthStatusCondition::Failed => write!(f, "FAILED"),
            PackageInstanceAuthStatusCondition::Unused => write!(f, "UNUSED"),
        }
    }
}

impl std::str::FromStr for PackageInstanceAuthStatusCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PackageInstanceAuthStatusCondition::Pending),
            "SUCCEEDED" => Ok(PackageInstanceAuthStatusCondition::Succeeded),
            "FAILED" => Ok(PackageInstanceAuthStatusCondition::Failed),
            "UNUSED" => Ok(PackageInstanceAuthStatusCondition::Unused),
            _ => Err(format!("unknown package instance auth status condition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInstanceAuthStatus {
    pub condition: PackageInstanceAuthStatusCondition,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub reason: String,
}

/// Credentials issued for one consumer of a Package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInstanceAuth {
    pub id: Id,
    pub package_id: Id,
    pub runtime_id: Option<Id>,
    pub runtime_context_id: Option<Id>,
    pub tenant: String,
    pub context: Option<String>,
    pub input_params: Option<String>,
    pub auth: Option<Auth>,
    pub status: Option<PackageInstanceAuthStatus>,
}

impl PackageInstanceAuth {
    /// Sets the canned status for `condition`.
    ///
    /// Only PENDING, SUCCEEDED and UNUSED have a default status; the current status is kept
    /// when another condition is requested.
    pub fn set_default_status(
        &mut self,
        condition: PackageInstanceAuthStatusCondition,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let (reason, message) = match condition {
            PackageInstanceAuthStatusCondition::Succeeded => {
                ("CredentialsProvided", "Credentials were provided.")
            }
            PackageInstanceAuthStatusCondition::Pending => {
                ("CredentialsNotProvided", "Credentials were not yet provided.")
            }
            PackageInstanceAuthStatusCondition::Unused => (
                "PendingDeletion",
                "Credentials for given Package Instance Auth are ready for being deleted by Application or Integration System.",
            ),
            PackageInstanceAuthStatusCondition::Failed => {
                return Err(AppError::InvalidData("invalid status condition".to_string()))
            }
        };

        self.status = Some(PackageInstanceAuthStatus {
            condition,
            timestamp,
            message: message.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    pub fn status_condition(&self) -> Option<PackageInstanceAuthStatusCondition> {
        self.status.as_ref().map(|s| s.condition)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageInstanceAuthRequestInput {
    pub id: Option<Id>,
    pub context: Option<String>,
    pub input_params: Option<String>,
    pub runtime_id: Option<Id>,
    pub runtime_context_id: Option<Id>,
}

impl PackageInstanceAuthRequestInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_json_field("context", self.context.as_deref())?;
        validate_json_field("inputParams", self.input_params.as_deref())
    }

    pub fn to_package_instance_auth(
        &self,
        id: Id,
        package_id: Id,
        tenant: String,
        auth: Option<Auth>,
        status: Option<PackageInstanceAuthStatus>,
    ) -> PackageInstanceAuth {
        PackageInstanceAuth {
            id,
            package_id,
            runtime_id: self.runtime_id.clone(),
            runtime_context_id: self.runtime_context_id.clone(),
            tenant,
            context: self.context.clone(),
            input_params: self.input_params.clone(),
            auth,
            status,
        }
    }
}

fn validate_json_field(field: &str, value: Option<&str>) -> Result<(), AppError> {
    if let Some(value) = value {
        serde_json::from_str::<serde_json::Value>(value)
            .map_err(|err| AppError::InvalidData(format!("{}: must be a valid JSON ({})", field, err)))?;
    }
    Ok(())
}

/// Conditions a caller may set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageInstanceAuthSetStatusCondition {
    Succeeded,
    Failed,
}

impl From<PackageInstanceAuthSetStatusCondition> for PackageInstanceAuthStatusCondition {
    fn from(value: PackageInstanceAuthSetStatusCondition) -> Self {
        match value {
            PackageInstanceAuthSetStatusCondition::Succeeded => PackageInstanceAuthStatusCondition::Succeeded,
            PackageInstanceAuthSetStatusCondition::Failed => PackageInstanceAuthStatusCondition::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageInstanceAuthStatusInput {
    pub condition: PackageInstanceAuthSetStatusCondition,
    pub message: String,
    pub reason: String,
}

impl PackageInstanceAuthStatusInput {
    pub fn to_status(&self, timestamp: DateTime<Utc>) -> PackageInstanceAuthStatus {
        PackageInstanceAuthStatus {
            condition: self.condition.into(),
            timestamp,
            message: self.message.clone(),
            reason: self.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageInstanceAuthSetInput {
    pub auth: Option<AuthInput>,
    pub status: Option<PackageInstanceAuthStatusInput>,
}

impl PackageInstanceAuthSetInput {
    pub fn validate(&self) -> Result<(), AppError> {
        match (&self.auth, &self.status) {
            (None, None) => Err(AppError::InvalidData(
                "at least one field (auth or status) has to be provided".to_string(),
            )),
            (Some(_), Some(status)) if status.condition == PackageInstanceAuthSetStatusCondition::Failed => {
                Err(AppError::InvalidData(
                    "status: condition must be SUCCEEDED when auth is provided".to_string(),
                ))
            }
            (None, Some(status)) if status.condition == PackageInstanceAuthSetStatusCondition::Succeeded => {
                Err(AppError::InvalidData(
                    "status: condition must be FAILED when auth is not provided".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}
