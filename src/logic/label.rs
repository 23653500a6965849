use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::apperrors::{is_not_found_error, AppError};
use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::{
    json_schema, Label, LabelDefinition, LabelInput, LabelableObject, SCENARIOS_KEY,
};
use crate::store::traits::{LabelDefinitionRepository, LabelRepository};
use crate::tenant;

pub struct LabelService {
    labels: Arc<dyn LabelRepository>,
    definitions: Arc<dyn LabelDefinitionRepository>,
    uid: Arc<dyn UidService>,
}

fn ensure_not_scenarios(key: &str) -> Result<(), AppError> {
    if key == SCENARIOS_KEY {
        return Err(AppError::InvalidOperation(format!(
            "label with key {} can be changed only by assigning to or unassigning from a formation",
            SCENARIOS_KEY
        )));
    }
    Ok(())
}

impl LabelService {
    pub fn new(
        labels: Arc<dyn LabelRepository>,
        definitions: Arc<dyn LabelDefinitionRepository>,
        uid: Arc<dyn UidService>,
    ) -> Self {
        Self {
            labels,
            definitions,
            uid,
        }
    }

    /// Sets a user label. The `scenarios` label is reserved for formations.
    pub async fn set(&self, ctx: &RequestContext, input: &LabelInput) -> Result<Label> {
        let tenant = tenant::load_from_context(ctx)?;
        ensure_not_scenarios(&input.key)?;
        self.upsert(ctx, &tenant, input).await
    }

    /// Creates or replaces the label `input.key` of the object.
    ///
    /// The value is validated against the label definition of the key; a definition without
    /// schema is created when the key is new to the tenant.
    pub(crate) async fn upsert(&self, ctx: &RequestContext, tenant: &str, input: &LabelInput) -> Result<Label> {
        input.validate()?;

        match self.definitions.get_by_key(ctx, tenant, &input.key).await {
            Ok(def) => {
                if let Some(schema) = &def.schema {
                    let validator = json_schema::compile(schema)?;
                    json_schema::validate(&validator, &input.value).with_context(|| {
                        format!("while validating value for label with key {}", input.key)
                    })?;
                }
            }
            Err(err) if is_not_found_error(&err) => {
                let def = LabelDefinition {
                    id: self.uid.generate(),
                    tenant: tenant.to_string(),
                    key: input.key.clone(),
                    schema: None,
                };
                self.definitions
                    .create(ctx, &def)
                    .await
                    .with_context(|| format!("while creating label definition with key {}", input.key))?;
            }
            Err(err) => {
                return Err(err.context(format!("while getting label definition with key {}", input.key)))
            }
        }

        let existing = self
            .labels
            .get_by_key(ctx, tenant, input.object_type, &input.object_id, &input.key)
            .await;
        match existing {
            Ok(mut label) => {
                label.value = input.value.clone();
                self.labels
                    .update(ctx, &label)
                    .await
                    .with_context(|| format!("while updating label with key {}", input.key))?;
                Ok(label)
            }
            Err(err) if is_not_found_error(&err) => {
                let label = input.to_label(self.uid.generate(), tenant.to_string());
                self.labels
                    .create(ctx, &label)
                    .await
                    .with_context(|| format!("while creating label with key {}", input.key))?;
                Ok(label)
            }
            Err(err) => Err(err.context(format!("while getting label with key {}", input.key))),
        }
    }

    pub async fn get(
        &self,
        ctx: &RequestContext,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<Label> {
        let tenant = tenant::load_from_context(ctx)?;
        self.labels
            .get_by_key(ctx, &tenant, object_type, object_id, key)
            .await
            .with_context(|| format!("while getting label {} for {} {}", key, object_type, object_id))
    }

    pub async fn list_for_object(
        &self,
        ctx: &RequestContext,
        object_type: LabelableObject,
        object_id: &str,
    ) -> Result<Vec<Label>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.labels
            .list_for_object(ctx, &tenant, object_type, object_id)
            .await
            .with_context(|| format!("while listing labels for {} {}", object_type, object_id))
    }

    /// Deletes a user label and returns it.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<Label> {
        let tenant = tenant::load_from_context(ctx)?;
        ensure_not_scenarios(key)?;
        let label = self.get(ctx, object_type, object_id, key).await?;
        self.labels
            .delete(ctx, &tenant, object_type, object_id, key)
            .await
            .with_context(|| format!("while deleting label {} for {} {}", key, object_type, object_id))?;
        Ok(label)
    }

    /// Formations the object is assigned to; empty when it has no `scenarios` label.
    pub async fn scenarios_for_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
    ) -> Result<Vec<String>> {
        match self
            .labels
            .get_by_key(ctx, tenant, object_type, object_id, SCENARIOS_KEY)
            .await
        {
            Ok(label) => Ok(label.scenarios()?),
            Err(err) if is_not_found_error(&err) => Ok(Vec::new()),
            Err(err) => Err(err.context("while getting scenarios label")),
        }
    }

    /// Writes the `scenarios` label; an empty list removes it.
    pub(crate) async fn set_scenarios(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        scenarios: &[String],
    ) -> Result<()> {
        if scenarios.is_empty() {
            if self.scenarios_for_object(ctx, tenant, object_type, object_id).await?.is_empty() {
                return Ok(());
            }
            return self
                .labels
                .delete(ctx, tenant, object_type, object_id, SCENARIOS_KEY)
                .await
                .context("while deleting scenarios label");
        }

        let input = LabelInput {
            key: SCENARIOS_KEY.to_string(),
            value: Value::from(scenarios.to_vec()),
            object_id: object_id.to_string(),
            object_type,
        };
        self.upsert(ctx, tenant, &input).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::uid::SequenceUidService;
    use crate::model::label_definition::scenarios_definition;
    use crate::store::mocks::{
        tenant_context, InMemoryLabelDefinitionRepository, InMemoryLabelRepository, TEST_TENANT,
    };
    use serde_json::json;

    struct Fixture {
        labels: Arc<InMemoryLabelRepository>,
        definitions: Arc<InMemoryLabelDefinitionRepository>,
        svc: LabelService,
    }

    fn fixture() -> Fixture {
        let labels = Arc::new(InMemoryLabelRepository::default());
        let definitions = Arc::new(InMemoryLabelDefinitionRepository::default());
        let svc = LabelService::new(
            labels.clone(),
            definitions.clone(),
            Arc::new(SequenceUidService::default()),
        );
        Fixture {
            labels,
            definitions,
            svc,
        }
    }

    fn input(key: &str, value: Value) -> LabelInput {
        LabelInput {
            key: key.to_string(),
            value,
            object_id: "app".to_string(),
            object_type: LabelableObject::Application,
        }
    }

    #[tokio::test]
    async fn test_set_creates_then_updates() {
        let f = fixture();
        let ctx = tenant_context();

        let created = f.svc.set(&ctx, &input("env", json!("dev"))).await.unwrap();
        let updated = f.svc.set(&ctx, &input("env", json!("prod"))).await.unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(f.labels.table.all()[0].value, json!("prod"));
        assert_eq!(f.labels.calls.count("create"), 1);
        assert_eq!(f.labels.calls.count("update"), 1);
        assert_eq!(f.definitions.table.all().len(), 1);
    }

    #[tokio::test]
    async fn test_set_validates_against_definition() {
        let f = fixture();
        f.definitions.table.insert(LabelDefinition {
            id: "def".to_string(),
            tenant: TEST_TENANT.to_string(),
            key: "env".to_string(),
            schema: Some(json!({"type": "string"})),
        });

        let err = f.svc.set(&tenant_context(), &input("env", json!(1))).await.unwrap_err();

        assert!(format!("{:#}", err).contains("does not satisfy the schema"));
        assert!(!f.labels.calls.was_called("create"));
    }

    #[tokio::test]
    async fn test_scenarios_key_is_reserved() {
        let f = fixture();
        let ctx = tenant_context();
        let err = f
            .svc
            .set(&ctx, &input(SCENARIOS_KEY, json!(["f"])))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("formation"));

        assert!(f
            .svc
            .delete(&ctx, LabelableObject::Application, "app", SCENARIOS_KEY)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_set_scenarios_uses_enum() {
        let f = fixture();
        let ctx = tenant_context();
        f.definitions
            .table
            .insert(scenarios_definition("def".to_string(), TEST_TENANT.to_string(), &["alpha".to_string()]));

        f.svc
            .set_scenarios(&ctx, TEST_TENANT, LabelableObject::Application, "app", &["alpha".to_string()])
            .await
            .unwrap();
        assert_eq!(
            f.svc
                .scenarios_for_object(&ctx, TEST_TENANT, LabelableObject::Application, "app")
                .await
                .unwrap(),
            vec!["alpha"]
        );

        assert!(f
            .svc
            .set_scenarios(&ctx, TEST_TENANT, LabelableObject::Application, "app", &["gamma".to_string()])
            .await
            .is_err());

        f.svc
            .set_scenarios(&ctx, TEST_TENANT, LabelableObject::Application, "app", &[])
            .await
            .unwrap();
        assert!(f.labels.table.all().is_empty());
    }
}
