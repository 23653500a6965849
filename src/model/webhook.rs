use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::auth::{Auth, AuthInput};
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookType {
    ConfigurationChanged,
    RegisterApplication,
    UnregisterApplication,
    OpenResourceDiscovery,
}

impl std::fmt::Display for WebhookType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WebhookType::ConfigurationChanged => write!(f, "CONFIGURATION_CHANGED"),
            WebhookType::RegisterApplication => write!(f, "REGISTER_APPLICATION"),
            WebhookType::UnregisterApplication => write!(f, "UNREGISTER_APPLICATION"),
            WebhookType::OpenResourceDiscovery => write!(f, "OPEN_RESOURCE_DISCOVERY"),
        }
    }
}

impl std::str::FromStr for WebhookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIGURATION_CHANGED" => Ok(WebhookType::ConfigurationChanged),
            "REGISTER_APPLICATION" => Ok(WebhookType::RegisterApplication),
            "UNREGISTER_APPLICATION" => Ok(WebhookType::UnregisterApplication),
            "OPEN_RESOURCE_DISCOVERY" => Ok(WebhookType::OpenResourceDiscovery),
            _ => Err(format!("unknown webhook type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookMode {
    Sync,
    Async,
}

impl std::fmt::Display for WebhookMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WebhookMode::Sync => write!(f, "SYNC"),
            WebhookMode::Async => write!(f, "ASYNC"),
        }
    }
}

impl std::str::FromStr for WebhookMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SYNC" => Ok(WebhookMode::Sync),
            "ASYNC" => Ok(WebhookMode::Async),
            _ => Err(format!("unknown webhook mode: {}", s)),
        }
    }
}

/// Kind of object a webhook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookReferenceObjectType {
    Application,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Id,
    pub tenant: String,
    pub object_id: Id,
    pub object_type: WebhookReferenceObjectType,
    pub webhook_type: WebhookType,
    pub mode: Option<WebhookMode>,
    pub url: Option<String>,
    pub auth: Option<Auth>,
    pub correlation_id_key: Option<String>,
    pub retry_interval: Option<i32>,
    pub timeout: Option<i32>,
    pub url_template: Option<String>,
    pub input_template: Option<String>,
    pub header_template: Option<String>,
    pub output_template: Option<String>,
    pub status_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookInput {
    pub webhook_type: WebhookType,
    pub mode: Option<WebhookMode>,
    pub url: Option<String>,
    pub auth: Option<AuthInput>,
    pub correlation_id_key: Option<String>,
    pub retry_interval: Option<i32>,
    pub timeout: Option<i32>,
    pub url_template: Option<String>,
    pub input_template: Option<String>,
    pub header_template: Option<String>,
    pub output_template: Option<String>,
    pub status_template: Option<String>,
}

impl WebhookInput {
    pub fn new(webhook_type: WebhookType, url: impl Into<String>) -> Self {
        Self {
            webhook_type,
            mode: None,
            url: Some(url.into()),
            auth: None,
            correlation_id_key: None,
            retry_interval: None,
            timeout: None,
            url_template: None,
            input_template: None,
            header_template: None,
            output_template: None,
            status_template: None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.url.is_none() && self.url_template.is_none() {
            return Err(AppError::InvalidData(
                "url: either url or urlTemplate has to be provided".to_string(),
            ));
        }
        if self.url.is_some() && self.url_template.is_some() {
            return Err(AppError::InvalidData(
                "url: url and urlTemplate are mutually exclusive".to_string(),
            ));
        }
        if self.mode == Some(WebhookMode::Async) && self.status_template.is_none() {
            return Err(AppError::InvalidData(
                "statusTemplate: is required for ASYNC webhooks".to_string(),
            ));
        }
        for (field, value) in [("retryInterval", self.retry_interval), ("timeout", self.timeout)] {
            if matches!(value, Some(v) if v < 0) {
                return Err(AppError::InvalidData(format!("{}: must not be negative", field)));
            }
        }
        Ok(())
    }

    pub fn to_webhook(
        &self,
        id: Id,
        tenant: String,
        object_id: Id,
        object_type: WebhookReferenceObjectType,
    ) -> Webhook {
        Webhook {
            id,
            tenant,
            object_id,
            object_type,
            webhook_type: self.webhook_type,
            mode: self.mode,
            url: self.url.clone(),
            auth: self.auth.as_ref().map(AuthInput::to_auth),
            correlation_id_key: self.correlation_id_key.clone(),
            retry_interval: self.retry_interval,
            timeout: self.timeout,
            url_template: self.url_template.clone(),
            input_template: self.input_template.clone(),
            header_template: self.header_template.clone(),
            output_template: self.output_template.clone(),
            status_template: self.status_template.clone(),
        }
    }
}
