use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::{Id, Webhook, WebhookInput, WebhookReferenceObjectType};
use crate::store::traits::{ApplicationRepository, RuntimeRepository, WebhookRepository};
use crate::tenant;

pub struct WebhookService {
    webhooks: Arc<dyn WebhookRepository>,
    applications: Arc<dyn ApplicationRepository>,
    runtimes: Arc<dyn RuntimeRepository>,
    uid: Arc<dyn UidService>,
}

impl WebhookService {
    pub fn new(
        webhooks: Arc<dyn WebhookRepository>,
        applications: Arc<dyn ApplicationRepository>,
        runtimes: Arc<dyn RuntimeRepository>,
        uid: Arc<dyn UidService>,
    ) -> Self {
        Self {
            webhooks,
            applications,
            runtimes,
            uid,
        }
    }

    async fn ensure_object_exists(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
    ) -> Result<()> {
        let (exists, resource) = match object_type {
            WebhookReferenceObjectType::Application => (
                self.applications.exists(ctx, tenant, object_id).await?,
                ResourceType::Application,
            ),
            WebhookReferenceObjectType::Runtime => (
                self.runtimes.exists(ctx, tenant, object_id).await?,
                ResourceType::Runtime,
            ),
        };
        if !exists {
            return Err(AppError::not_found(resource, object_id).into());
        }
        Ok(())
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
        input: &WebhookInput,
    ) -> Result<Id> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;
        self.ensure_object_exists(ctx, &tenant, object_id, object_type)
            .await
            .context("while checking webhook owner")?;

        let id = self.uid.generate();
        let webhook = input.to_webhook(id.clone(), tenant, object_id.to_string(), object_type);
        self.webhooks
            .create(ctx, &webhook)
            .await
            .with_context(|| format!("while creating webhook with id {}", id))?;
        log::debug!("created {} webhook {} for {}", input.webhook_type, id, object_id);
        Ok(id)
    }

    /// Replaces every field from `input`; the owning object stays the same.
    pub async fn update(&self, ctx: &RequestContext, id: &str, input: &WebhookInput) -> Result<()> {
        input.validate()?;
        let current = self.get(ctx, id).await?;
        let webhook = input.to_webhook(current.id, current.tenant, current.object_id, current.object_type);
        self.webhooks
            .update(ctx, &webhook)
            .await
            .with_context(|| format!("while updating webhook with id {}", id))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        self.webhooks
            .delete(ctx, &tenant, id)
            .await
            .with_context(|| format!("while deleting webhook with id {}", id))
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Webhook> {
        let tenant = tenant::load_from_context(ctx)?;
        self.webhooks
            .get_by_id(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting webhook with id {}", id))
    }

    pub async fn list_for_object(
        &self,
        ctx: &RequestContext,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
    ) -> Result<Vec<Webhook>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.webhooks
            .list_by_object(ctx, &tenant, object_id, object_type)
            .await
            .with_context(|| format!("while listing webhooks for {}", object_id))
    }
}
