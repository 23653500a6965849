use anyhow::{anyhow, Result};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Webhook, WebhookReferenceObjectType};
use crate::store::convert::{marshal, parse_enum, unmarshal};
use crate::store::repo::{Condition, Creator, Deleter, Entity, Lister, SingleGetter, Updater, Value};
use crate::store::traits::WebhookRepository;

pub const WEBHOOK_TABLE: &str = "public.webhooks";

const COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "app_id",
    "runtime_id",
    "type",
    "mode",
    "url",
    "auth",
    "correlation_id_key",
    "retry_interval",
    "timeout",
    "url_template",
    "input_template",
    "header_template",
    "output_template",
    "status_template",
];

const UPDATABLE_COLUMNS: &[&str] = &[
    "type",
    "mode",
    "url",
    "auth",
    "correlation_id_key",
    "retry_interval",
    "timeout",
    "url_template",
    "input_template",
    "header_template",
    "output_template",
    "status_template",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WebhookEntity {
    pub id: String,
    pub tenant_id: String,
    pub app_id: Option<String>,
    pub runtime_id: Option<String>,
    #[sqlx(rename = "type")]
    pub webhook_type: String,
    pub mode: Option<String>,
    pub url: Option<String>,
    pub auth: Option<String>,
    pub correlation_id_key: Option<String>,
    pub retry_interval: Option<i32>,
    pub timeout: Option<i32>,
    pub url_template: Option<String>,
    pub input_template: Option<String>,
    pub header_template: Option<String>,
    pub output_template: Option<String>,
    pub status_template: Option<String>,
}

impl Entity for WebhookEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("app_id", self.app_id.clone().into()),
            ("runtime_id", self.runtime_id.clone().into()),
            ("type", self.webhook_type.clone().into()),
            ("mode", self.mode.clone().into()),
            ("url", self.url.clone().into()),
            ("auth", self.auth.clone().into()),
            ("correlation_id_key", self.correlation_id_key.clone().into()),
            ("retry_interval", self.retry_interval.into()),
            ("timeout", self.timeout.into()),
            ("url_template", self.url_template.clone().into()),
            ("input_template", self.input_template.clone().into()),
            ("header_template", self.header_template.clone().into()),
            ("output_template", self.output_template.clone().into()),
            ("status_template", self.status_template.clone().into()),
        ]
    }
}

impl WebhookEntity {
    pub fn from_model(webhook: &Webhook) -> Result<Self> {
        let (app_id, runtime_id) = match webhook.object_type {
            WebhookReferenceObjectType::Application => (Some(webhook.object_id.clone()), None),
            WebhookReferenceObjectType::Runtime => (None, Some(webhook.object_id.clone())),
        };
        Ok(Self {
            id: webhook.id.clone(),
            tenant_id: webhook.tenant.clone(),
            app_id,
            runtime_id,
            webhook_type: webhook.webhook_type.to_string(),
            mode: webhook.mode.map(|m| m.to_string()),
            url: webhook.url.clone(),
            auth: marshal(webhook.auth.as_ref(), "auth")?,
            correlation_id_key: webhook.correlation_id_key.clone(),
            retry_interval: webhook.retry_interval,
            timeout: webhook.timeout,
            url_template: webhook.url_template.clone(),
            input_template: webhook.input_template.clone(),
            header_template: webhook.header_template.clone(),
            output_template: webhook.output_template.clone(),
            status_template: webhook.status_template.clone(),
        })
    }

    pub fn into_model(self) -> Result<Webhook> {
        let (object_id, object_type) = match (self.app_id, self.runtime_id) {
            (Some(app_id), None) => (app_id, WebhookReferenceObjectType::Application),
            (None, Some(runtime_id)) => (runtime_id, WebhookReferenceObjectType::Runtime),
            _ => return Err(anyhow!("webhook {} must reference exactly one object", self.id)),
        };
        Ok(Webhook {
            id: self.id,
            tenant: self.tenant_id,
            object_id,
            object_type,
            webhook_type: parse_enum(&self.webhook_type)?,
            mode: self.mode.as_deref().map(parse_enum).transpose()?,
            url: self.url,
            auth: unmarshal(self.auth.as_deref(), "auth")?,
            correlation_id_key: self.correlation_id_key,
            retry_interval: self.retry_interval,
            timeout: self.timeout,
            url_template: self.url_template,
            input_template: self.input_template,
            header_template: self.header_template,
            output_template: self.output_template,
            status_template: self.status_template,
        })
    }
}

fn object_column(object_type: WebhookReferenceObjectType) -> &'static str {
    match object_type {
        WebhookReferenceObjectType::Application => "app_id",
        WebhookReferenceObjectType::Runtime => "runtime_id",
    }
}

pub struct PgWebhookRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
    updater: Updater,
    deleter: Deleter,
}

impl PgWebhookRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Webhook;
        Self {
            creator: Creator::new(resource, WEBHOOK_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, WEBHOOK_TABLE, "tenant_id", COLUMNS),
            lister: Lister::new(resource, WEBHOOK_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, WEBHOOK_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, WEBHOOK_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgWebhookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WebhookRepository for PgWebhookRepository {
    async fn create(&self, ctx: &RequestContext, webhook: &Webhook) -> Result<()> {
        self.creator
            .create(ctx, &WebhookEntity::from_model(webhook)?)
            .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Webhook> {
        let entity: WebhookEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn list_by_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
    ) -> Result<Vec<Webhook>> {
        let entities: Vec<WebhookEntity> = self
            .lister
            .list(
                ctx,
                tenant,
                vec![Condition::eq(object_column(object_type), object_id)],
                "id",
            )
            .await?;
        entities.into_iter().map(WebhookEntity::into_model).collect()
    }

    async fn update(&self, ctx: &RequestContext, webhook: &Webhook) -> Result<()> {
        self.updater
            .update_single(ctx, &webhook.tenant, &WebhookEntity::from_model(webhook)?)
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WebhookInput, WebhookMode, WebhookType};

    #[test]
    fn test_runtime_webhook_round_trip() {
        let mut input = WebhookInput::new(WebhookType::ConfigurationChanged, "https://hook.local");
        input.mode = Some(WebhookMode::Sync);
        input.retry_interval = Some(30);
        let webhook = input.to_webhook(
            "wh".to_string(),
            "tenant".to_string(),
            "rt".to_string(),
            WebhookReferenceObjectType::Runtime,
        );

        let entity = WebhookEntity::from_model(&webhook).unwrap();
        assert_eq!(entity.app_id, None);
        assert_eq!(entity.runtime_id.as_deref(), Some("rt"));
        assert_eq!(entity.webhook_type, "CONFIGURATION_CHANGED");
        assert_eq!(entity.into_model().unwrap(), webhook);
    }

    #[test]
    fn test_entity_without_owner_fails() {
        let webhook = WebhookInput::new(WebhookType::RegisterApplication, "https://hook.local").to_webhook(
            "wh".to_string(),
            "tenant".to_string(),
            "app".to_string(),
            WebhookReferenceObjectType::Application,
        );
        let mut entity = WebhookEntity::from_model(&webhook).unwrap();
        entity.app_id = None;
        assert!(entity.into_model().is_err());
    }
}
