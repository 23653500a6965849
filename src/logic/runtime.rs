use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::logic::label::LabelService;
use crate::logic::uid::{TimestampGenerator, UidService};
use crate::model::{Id, Label, LabelInput, LabelableObject, Page, Runtime, RuntimeInput};
use crate::store::traits::RuntimeRepository;
use crate::tenant;

pub struct RuntimeService {
    runtimes: Arc<dyn RuntimeRepository>,
    labels: Arc<LabelService>,
    uid: Arc<dyn UidService>,
    timestamp: TimestampGenerator,
}

impl RuntimeService {
    pub fn new(
        runtimes: Arc<dyn RuntimeRepository>,
        labels: Arc<LabelService>,
        uid: Arc<dyn UidService>,
        timestamp: TimestampGenerator,
    ) -> Self {
        Self {
            runtimes,
            labels,
            uid,
            timestamp,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, input: &RuntimeInput) -> Result<Id> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;

        let id = self.uid.generate();
        let runtime = input.to_runtime(id.clone(), tenant, (self.timestamp)());
        self.runtimes
            .create(ctx, &runtime)
            .await
            .with_context(|| format!("while creating runtime with name {}", input.name))?;

        for (key, value) in &input.labels {
            self.set_label(ctx, &id, key, value.clone()).await?;
        }

        log::info!("registered runtime {} with id {}", runtime.name, id);
        Ok(id)
    }

    /// Updates name, description and status; labels are managed separately.
    pub async fn update(&self, ctx: &RequestContext, id: &str, input: &RuntimeInput) -> Result<()> {
        input.validate()?;
        let mut runtime = self.get(ctx, id).await?;
        runtime.set_from_input(input, (self.timestamp)());
        self.runtimes
            .update(ctx, &runtime)
            .await
            .with_context(|| format!("while updating runtime with id {}", id))
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Runtime> {
        let tenant = tenant::load_from_context(ctx)?;
        self.runtimes
            .get_by_id(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting runtime with id {}", id))
    }

    pub async fn exists(&self, ctx: &RequestContext, id: &str) -> Result<bool> {
        let tenant = tenant::load_from_context(ctx)?;
        self.runtimes
            .exists(ctx, &tenant, id)
            .await
            .with_context(|| format!("while checking if runtime {} exists", id))
    }

    pub async fn list(&self, ctx: &RequestContext, page_size: i32, cursor: &str) -> Result<Page<Runtime>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.runtimes
            .list(ctx, &tenant, page_size, cursor)
            .await
            .context("while listing runtimes")
    }

    /// Deletes the runtime; refused while it is assigned to a formation.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        let runtime = self.get(ctx, id).await?;

        let formations = self
            .labels
            .scenarios_for_object(ctx, &tenant, LabelableObject::Runtime, id)
            .await?;
        if !formations.is_empty() {
            return Err(AppError::InvalidOperation(format!(
                "the runtime {} is part of formations [{}]; unassign it first",
                runtime.name,
                formations.join(", ")
            ))
            .into());
        }

        self.runtimes
            .delete(ctx, &tenant, id)
            .await
            .with_context(|| format!("while deleting runtime with id {}", id))?;
        log::info!("unregistered runtime {} with id {}", runtime.name, id);
        Ok(())
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
                    object_type: LabelableObject::Runtime,
                },
            )
            .await
            .with_context(|| format!("while setting label {} for runtime {}", key, id))
    }

    pub async fn delete_label(&self, ctx: &RequestContext, id: &str, key: &str) -> Result<Label> {
        self.ensure_exists(ctx, id).await?;
        self.labels.delete(ctx, LabelableObject::Runtime, id, key).await
    }

    async fn ensure_exists(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        if !self.exists(ctx, id).await? {
            return Err(AppError::not_found(ResourceType::Runtime, id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apperrors::is_not_found_error;
    use crate::logic::uid::{utc_now_generator, SequenceUidService};
    use crate::model::RuntimeStatusCondition;
    use crate::store::mocks::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn fixture() -> (Arc<InMemoryRuntimeRepository>, Arc<InMemoryLabelRepository>, RuntimeService) {
        let uid: Arc<dyn UidService> = Arc::new(SequenceUidService::default());
        let runtimes = Arc::new(InMemoryRuntimeRepository::default());
        let labels = Arc::new(InMemoryLabelRepository::default());
        let label_svc = Arc::new(LabelService::new(
            labels.clone(),
            Arc::new(InMemoryLabelDefinitionRepository::default()),
            uid.clone(),
        ));
        let svc = RuntimeService::new(runtimes.clone(), label_svc, uid, utc_now_generator());
        (runtimes, labels, svc)
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let (_, labels, svc) = fixture();
        let ctx = tenant_context();
        let input = RuntimeInput {
            name: "kyma-eu".to_string(),
            labels: HashMap::from([("region".to_string(), json!("eu-1"))]),
            ..Default::default()
        };

        let id = svc.create(&ctx, &input).await.unwrap();
        assert_eq!(labels.table.all().len(), 1);

        let update = RuntimeInput {
            name: "kyma-eu".to_string(),
            description: Some("primary".to_string()),
            status_condition: Some(RuntimeStatusCondition::Connected),
            ..Default::default()
        };
        svc.update(&ctx, &id, &update).await.unwrap();

        let runtime = svc.get(&ctx, &id).await.unwrap();
        assert_eq!(runtime.description.as_deref(), Some("primary"));
        assert_eq!(runtime.status.condition, RuntimeStatusCondition::Connected);
    }

    #[tokio::test]
    async fn test_update_missing_runtime() {
        let (runtimes, _, svc) = fixture();
        let input = RuntimeInput {
            name: "missing".to_string(),
            ..Default::default()
        };

        let err = svc.update(&tenant_context(), "nope", &input).await.unwrap_err();

        assert!(is_not_found_error(&err));
        assert!(!runtimes.calls.was_called("update"));
    }

    #[tokio::test]
    async fn test_delete_label() {
        let (_, labels, svc) = fixture();
        let ctx = tenant_context();
        let id = svc
            .create(&ctx, &RuntimeInput { name: "rt".to_string(), ..Default::default() })
            .await
            .unwrap();
        svc.set_label(&ctx, &id, "tier", json!("gold")).await.unwrap();

        let deleted = svc.delete_label(&ctx, &id, "tier").await.unwrap();

        assert_eq!(deleted.value, json!("gold"));
        assert!(labels.table.all().is_empty());
    }
}
