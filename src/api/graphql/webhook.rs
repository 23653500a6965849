use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};

use super::auth::{Auth, AuthInput};
use super::scalars::Clob;
use super::{services, transact};
use crate::apperrors::AppError;
use crate::model;
use crate::model::WebhookReferenceObjectType;

mirror_enum!(WebhookType => WebhookType {
    ConfigurationChanged,
    RegisterApplication,
    UnregisterApplication,
    OpenResourceDiscovery,
});

mirror_enum!(WebhookMode => WebhookMode { Sync, Async });

#[derive(SimpleObject, Debug, Clone)]
pub struct Webhook {
    pub id: ID,
    #[graphql(name = "applicationID")]
    pub application_id: Option<ID>,
    #[graphql(name = "runtimeID")]
    pub runtime_id: Option<ID>,
    #[graphql(name = "type")]
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

impl From<model::Webhook> for Webhook {
    fn from(webhook: model::Webhook) -> Self {
        let (application_id, runtime_id) = match webhook.object_type {
            WebhookReferenceObjectType::Application => (Some(ID(webhook.object_id)), None),
            WebhookReferenceObjectType::Runtime => (None, Some(ID(webhook.object_id))),
        };
        Self {
            id: ID(webhook.id),
            application_id,
            runtime_id,
            webhook_type: webhook.webhook_type.into(),
            mode: webhook.mode.map(Into::into),
            url: webhook.url,
            auth: webhook.auth.map(Auth::from),
            correlation_id_key: webhook.correlation_id_key,
            retry_interval: webhook.retry_interval,
            timeout: webhook.timeout,
            url_template: webhook.url_template,
            input_template: webhook.input_template,
            header_template: webhook.header_template,
            output_template: webhook.output_template,
            status_template: webhook.status_template,
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct WebhookInput {
    #[graphql(name = "type")]
    pub webhook_type: WebhookType,
    pub mode: Option<WebhookMode>,
    pub url: Option<String>,
    pub auth: Option<AuthInput>,
    pub correlation_id_key: Option<String>,
    pub retry_interval: Option<i32>,
    pub timeout: Option<i32>,
    pub url_template: Option<Clob>,
    pub input_template: Option<Clob>,
    pub header_template: Option<Clob>,
    pub output_template: Option<Clob>,
    pub status_template: Option<Clob>,
}

impl From<WebhookInput> for model::WebhookInput {
    fn from(input: WebhookInput) -> Self {
        Self {
            webhook_type: input.webhook_type.into(),
            mode: input.mode.map(Into::into),
            url: input.url,
            auth: input.auth.map(Into::into),
            correlation_id_key: input.correlation_id_key,
            retry_interval: input.retry_interval,
            timeout: input.timeout,
            url_template: input.url_template.map(|c| c.0),
            input_template: input.input_template.map(|c| c.0),
            header_template: input.header_template.map(|c| c.0),
            output_template: input.output_template.map(|c| c.0),
            status_template: input.status_template.map(|c| c.0),
        }
    }
}

fn owner(application_id: Option<ID>, runtime_id: Option<ID>) -> anyhow::Result<(String, WebhookReferenceObjectType)> {
    match (application_id, runtime_id) {
        (Some(app), None) => Ok((app.0, WebhookReferenceObjectType::Application)),
        (None, Some(rt)) => Ok((rt.0, WebhookReferenceObjectType::Runtime)),
        _ => Err(AppError::InvalidData(
            "exactly one of applicationID or runtimeID has to be provided".to_string(),
        )
        .into()),
    }
}

#[derive(Default)]
pub struct WebhookMutation;

#[Object]
impl WebhookMutation {
    async fn add_webhook(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "applicationID")] application_id: Option<ID>,
        #[graphql(name = "runtimeID")] runtime_id: Option<ID>,
        #[graphql(name = "in")] input: WebhookInput,
    ) -> Result<Webhook> {
        let svc = services(ctx)?;
        let input = model::WebhookInput::from(input);
        transact(ctx, |tx| async move {
            let (object_id, object_type) = owner(application_id, runtime_id)?;
            let id = svc.webhooks.create(&tx, &object_id, object_type, &input).await?;
            svc.webhooks.get(&tx, &id).await.map(Webhook::from)
        })
        .await
    }

    async fn update_webhook(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "webhookID")] webhook_id: ID,
        #[graphql(name = "in")] input: WebhookInput,
    ) -> Result<Webhook> {
        let svc = services(ctx)?;
        let input = model::WebhookInput::from(input);
        transact(ctx, |tx| async move {
            svc.webhooks.update(&tx, &webhook_id, &input).await?;
            svc.webhooks.get(&tx, &webhook_id).await.map(Webhook::from)
        })
        .await
    }

    async fn delete_webhook(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "webhookID")] webhook_id: ID,
    ) -> Result<Webhook> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let webhook = svc.webhooks.get(&tx, &webhook_id).await?;
            svc.webhooks.delete(&tx, &webhook_id).await?;
            Ok(Webhook::from(webhook))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::graphql::testing::Harness;

    #[tokio::test]
    async fn test_webhook_lifecycle_on_application() {
        let h = Harness::new();
        h.execute_ok(r#"mutation { registerApplication(in: {name: "app"}) { id } }"#).await;

        let data = h
            .execute_ok(
                r#"mutation {
                    addWebhook(applicationID: "id-1", in: {type: CONFIGURATION_CHANGED, url: "https://hook.local"}) {
                        id applicationID runtimeID type url
                    }
                }"#,
            )
            .await;
        let webhook = &data["addWebhook"];
        assert_eq!(webhook["applicationID"], "id-1");
        assert!(webhook["runtimeID"].is_null());
        assert_eq!(webhook["type"], "CONFIGURATION_CHANGED");
        let id = webhook["id"].as_str().unwrap().to_string();

        let data = h
            .execute_ok(&format!(
                r#"mutation {{ updateWebhook(webhookID: "{}", in: {{type: REGISTER_APPLICATION, url: "https://other.local"}}) {{ url type }} }}"#,
                id
            ))
            .await;
        assert_eq!(data["updateWebhook"]["url"], "https://other.local");

        h.execute_ok(&format!(r#"mutation {{ deleteWebhook(webhookID: "{}") {{ id }} }}"#, id))
            .await;
        assert!(h.repos.webhooks.table.all().is_empty());
    }

    #[tokio::test]
    async fn test_add_webhook_requires_single_owner() {
        let h = Harness::new();

        let (_, errors) = h
            .execute(r#"mutation { addWebhook(in: {type: CONFIGURATION_CHANGED, url: "https://hook.local"}) { id } }"#)
            .await;

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("exactly one of applicationID or runtimeID"));
    }
}
