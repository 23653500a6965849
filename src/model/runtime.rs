use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::common::{validate_description, validate_dns_subdomain, validate_label_key};
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeStatusCondition {
    Initial,
    Provisioning,
    Connected,
    Failed,
}

impl std::fmt::Display for RuntimeStatusCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RuntimeStatusCondition::Initial => write!(f, "INITIAL"),
            RuntimeStatusCondition::Provisioning => write!(f, "PROVISIONING"),
            RuntimeStatusCondition::Connected => write!(f, "CONNECTED"),
            RuntimeStatusCondition::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for RuntimeStatusCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(RuntimeStatusCondition::Initial),
            "PROVISIONING" => Ok(RuntimeStatusCondition::Provisioning),
            "CONNECTED" => Ok(RuntimeStatusCondition::Connected),
            "FAILED" => Ok(RuntimeStatusCondition::Failed),
            _ => Err(format!("unknown runtime status condition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub condition: RuntimeStatusCondition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    pub id: Id,
    pub tenant: String,
    pub name: String,
    pub description: Option<String>,
    pub status: RuntimeStatus,
    pub creation_timestamp: DateTime<Utc>,
}

/// Used both for registration and for updates; labels are only applied on registration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuntimeInput {
    pub name: String,
    pub description: Option<String>,
    pub status_condition: Option<RuntimeStatusCondition>,
    pub labels: HashMap<String, serde_json::Value>,
}

impl RuntimeInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_dns_subdomain("name", &self.name)?;
        validate_description(self.description.as_deref())?;
        for key in self.labels.keys() {
            validate_label_key(key)?;
        }
        Ok(())
    }

    pub fn to_runtime(&self, id: Id, tenant: String, timestamp: DateTime<Utc>) -> Runtime {
        Runtime {
            id,
            tenant,
            name: self.name.clone(),
            description: self.description.clone(),
            status: RuntimeStatus {
                condition: self.status_condition.unwrap_or(RuntimeStatusCondition::Initial),
                timestamp,
            },
            creation_timestamp: timestamp,
        }
    }
}

impl Runtime {
    pub fn set_from_input(&mut self, input: &RuntimeInput, timestamp: DateTime<Utc>) {
        self.name = input.name.clone();
        self.description = input.description.clone();
        if let Some(condition) = input.status_condition {
            if condition != self.status.condition {
                self.status = RuntimeStatus {
                    condition,
                    timestamp,
                };
            }
        }
    }
}
