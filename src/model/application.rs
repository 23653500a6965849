use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::common::{validate_description, validate_dns_subdomain, validate_label_key};
use crate::model::webhook::WebhookInput;
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatusCondition {
    Initial,
    Unknown,
    Ready,
    Failed,
}

impl std::fmt::Display for ApplicationStatusCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ApplicationStatusCondition::Initial => write!(f, "INITIAL"),
            ApplicationStatusCondition::Unknown => write!(f, "UNKNOWN"),
            ApplicationStatusCondition::Ready => write!(f, "READY"),
            ApplicationStatusCondition::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for ApplicationStatusCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(ApplicationStatusCondition::Initial),
            "UNKNOWN" => Ok(ApplicationStatusCondition::Unknown),
            "READY" => Ok(ApplicationStatusCondition::Ready),
            "FAILED" => Ok(ApplicationStatusCondition::Failed),
            _ => Err(format!("unknown application status condition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub condition: ApplicationStatusCondition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Id,
    pub tenant: String,
    pub name: String,
    pub description: Option<String>,
    pub provider_name: Option<String>,
    pub status: ApplicationStatus,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
}

impl Application {
    /// Applies an update; a changed status condition gets a fresh timestamp
    pub fn set_from_update_input(&mut self, input: &ApplicationUpdateInput, timestamp: DateTime<Utc>) {
        self.description = input.description.clone();
        self.health_check_url = input.health_check_url.clone();
        self.provider_name = input.provider_name.clone();
        self.base_url = input.base_url.clone();
        if let Some(condition) = input.status_condition {
            if condition != self.status.condition {
                self.status = ApplicationStatus {
                    condition,
                    timestamp,
                };
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationRegisterInput {
    pub name: String,
    pub description: Option<String>,
    pub provider_name: Option<String>,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
    pub status_condition: Option<ApplicationStatusCondition>,
    pub labels: HashMap<String, serde_json::Value>,
    pub webhooks: Vec<WebhookInput>,
}

impl ApplicationRegisterInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_dns_subdomain("name", &self.name)?;
        validate_description(self.description.as_deref())?;
        for key in self.labels.keys() {
            validate_label_key(key)?;
        }
        for webhook in &self.webhooks {
            webhook.validate()?;
        }
        Ok(())
    }

    pub fn to_application(&self, id: Id, tenant: String, timestamp: DateTime<Utc>) -> Application {
        Application {
            id,
            tenant,
            name: self.name.clone(),
            description: self.description.clone(),
            provider_name: self.provider_name.clone(),
            status: ApplicationStatus {
                condition: self
                    .status_condition
                    .unwrap_or(ApplicationStatusCondition::Initial),
                timestamp,
            },
            health_check_url: self.health_check_url.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationUpdateInput {
    pub description: Option<String>,
    pub provider_name: Option<String>,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
    pub status_condition: Option<ApplicationStatusCondition>,
}

impl ApplicationUpdateInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_description(self.description.as_deref())
    }
}
