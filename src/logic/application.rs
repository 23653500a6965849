use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::logic::label::LabelService;
use crate::logic::uid::{TimestampGenerator, UidService};
use crate::logic::webhook::WebhookService;
use crate::model::{
    Application, ApplicationRegisterInput, ApplicationUpdateInput, Id, Label, LabelInput,
    LabelableObject, Page, WebhookReferenceObjectType,
};
use crate::store::traits::ApplicationRepository;
use crate::tenant;

pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    webhooks: Arc<WebhookService>,
    labels: Arc<LabelService>,
    uid: Arc<dyn UidService>,
    timestamp: TimestampGenerator,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        webhooks: Arc<WebhookService>,
        labels: Arc<LabelService>,
        uid: Arc<dyn UidService>,
        timestamp: TimestampGenerator,
    ) -> Self {
        Self {
            applications,
            webhooks,
            labels,
            uid,
            timestamp,
        }
    }

    /// Registers the application together with its webhooks and labels.
    pub async fn create(&self, ctx: &RequestContext, input: &ApplicationRegisterInput) -> Result<Id> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;

        let id = self.uid.generate();
        let app = input.to_application(id.clone(), tenant, (self.timestamp)());
        self.applications
            .create(ctx, &app)
            .await
            .with_context(|| format!("while creating application with name {}", input.name))?;

        for webhook in &input.webhooks {
            self.webhooks
                .create(ctx, &id, WebhookReferenceObjectType::Application, webhook)
                .await
                .with_context(|| format!("while creating webhooks for application {}", id))?;
        }
        for (key, value) in &input.labels {
            self.set_label(ctx, &id, key, value.clone()).await?;
        }

        log::info!("registered application {} with id {}", app.name, id);
        Ok(id)
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, input: &ApplicationUpdateInput) -> Result<()> {
        input.validate()?;
        let mut app = self.get(ctx, id).await?;
        app.set_from_update_input(input, (self.timestamp)());
        self.applications
            .update(ctx, &app)
            .await
            .with_context(|| format!("while updating application with id {}", id))
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Application> {
        let tenant = tenant::load_from_context(ctx)?;
        self.applications
            .get_by_id(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting application with id {}", id))
    }

    pub async fn exists(&self, ctx: &RequestContext, id: &str) -> Result<bool> {
        let tenant = tenant::load_from_context(ctx)?;
        self.applications
            .exists(ctx, &tenant, id)
            .await
            .with_context(|| format!("while checking if application {} exists", id))
    }

    pub async fn list(&self, ctx: &RequestContext, page_size: i32, cursor: &str) -> Result<Page<Application>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.applications
            .list(ctx, &tenant, page_size, cursor)
            .await
            .context("while listing applications")
    }

    /// Deletes the application; refused while it is assigned to a formation.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        let app = self.get(ctx, id).await?;

        let formations = self
            .labels
            .scenarios_for_object(ctx, &tenant, LabelableObject::Application, id)
            .await?;
        if !formations.is_empty() {
            return Err(AppError::InvalidOperation(format!(
                "the application {} is part of formations [{}]; unassign it first",
                app.name,
                formations.join(", ")
            ))
            .into());
        }

        self.applications
            .delete(ctx, &tenant, id)
            .await
            .with_context(|| format!("while deleting application with id {}", id))?;
        log::info!("unregistered application {} with id {}", app.name, id);
        Ok(())
    }

    /// System-level delete that ignores the tenant of the caller.
    pub async fn delete_global(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        self.applications
            .delete_global(ctx, id)
            .await
            .with_context(|| format!("while deleting application with id {} globally", id))
    }

    pub async fn set_label(&self, ctx: &RequestContext, id: &str, key: &str, value: Value) -> Result<Label> {
        self.ensure_exists(ctx, id).await?;
        self.labels
            .set(
                ctx,
                &LabelInput {
                    key: key.to_string(),
                    value,
                    object_id: id.to_string(),
                    object_type: LabelableObject::Application,
                },
            )
            .await
            .with_context(|| format!("while setting label {} for application {}", key, id))
    }

    pub async fn delete_label(&self, ctx: &RequestContext, id: &str, key: &str) -> Result<Label> {
        self.ensure_exists(ctx, id).await?;
        self.labels
            .delete(ctx, LabelableObject::Application, id, key)
            .await
    }

    async fn ensure_exists(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        if !self.exists(ctx, id).await? {
            return Err(AppError::not_found(ResourceType::Application, id).into());
        }
        Ok(())
    }
}
