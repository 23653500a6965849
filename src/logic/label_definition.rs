use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apperrors::{is_not_found_error, AppError};
use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::label_definition::{scenarios_definition, scenarios_schema};
use crate::model::{json_schema, LabelDefinition, LabelDefinitionInput, SCENARIOS_KEY};
use crate::store::traits::{LabelDefinitionRepository, LabelRepository};
use crate::tenant;

pub struct LabelDefinitionService {
    definitions: Arc<dyn LabelDefinitionRepository>,
    labels: Arc<dyn LabelRepository>,
    uid: Arc<dyn UidService>,
}

fn ensure_not_scenarios(key: &str) -> Result<(), AppError> {
    if key == SCENARIOS_KEY {
        return Err(AppError::InvalidOperation(format!(
            "label definition with key {} is managed through formations",
            SCENARIOS_KEY
        )));
    }
    Ok(())
}

impl LabelDefinitionService {
    pub fn new(
        definitions: Arc<dyn LabelDefinitionRepository>,
        labels: Arc<dyn LabelRepository>,
        uid: Arc<dyn UidService>,
    ) -> Self {
        Self {
            definitions,
            labels,
            uid,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, input: &LabelDefinitionInput) -> Result<LabelDefinition> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;
        ensure_not_scenarios(&input.key)?;

        let def = input.to_label_definition(self.uid.generate(), tenant);
        self.definitions
            .create(ctx, &def)
            .await
            .with_context(|| format!("while creating label definition with key {}", def.key))?;
        Ok(def)
    }

    /// Replaces the schema; every existing label with the key must satisfy the new one.
    pub async fn update(&self, ctx: &RequestContext, input: &LabelDefinitionInput) -> Result<LabelDefinition> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;
        ensure_not_scenarios(&input.key)?;

        let mut def = self.get(ctx, &input.key).await?;
        if let Some(schema) = &input.schema {
            let validator = json_schema::compile(schema)?;
            let labels = self
                .labels
                .list_by_key(ctx, &tenant, &input.key)
                .await
                .with_context(|| format!("while listing labels with key {}", input.key))?;
            for label in labels {
                json_schema::validate(&validator, &label.value).with_context(|| {
                    format!(
                        "label with key {} on {} {} does not satisfy the new schema",
                        label.key, label.object_type, label.object_id
                    )
                })?;
            }
        }

        def.schema = input.schema.clone();
        self.definitions
            .update(ctx, &def)
            .await
            .with_context(|| format!("while updating label definition with key {}", def.key))?;
        Ok(def)
    }

    pub async fn get(&self, ctx: &RequestContext, key: &str) -> Result<LabelDefinition> {
        let tenant = tenant::load_from_context(ctx)?;
        self.definitions
            .get_by_key(ctx, &tenant, key)
            .await
            .with_context(|| format!("while getting label definition with key {}", key))
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<LabelDefinition>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.definitions
            .list(ctx, &tenant)
            .await
            .context("while listing label definitions")
    }

    /// Deletes the definition; labels using the key are removed only when asked to.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        key: &str,
        delete_related_labels: bool,
    ) -> Result<LabelDefinition> {
        let tenant = tenant::load_from_context(ctx)?;
        ensure_not_scenarios(key)?;
        let def = self.get(ctx, key).await?;

        if delete_related_labels {
            let removed = self
                .labels
                .delete_by_key(ctx, &tenant, key)
                .await
                .with_context(|| format!("while deleting labels with key {}", key))?;
            log::debug!("deleted {} labels with key {}", removed, key);
        } else {
            let used = self
                .labels
                .list_by_key(ctx, &tenant, key)
                .await
                .with_context(|| format!("while listing labels with key {}", key))?;
            if !used.is_empty() {
                return Err(AppError::InvalidOperation(format!(
                    "could not delete label definition {}, it is already used by at least one label",
                    key
                ))
                .into());
            }
        }

        self.definitions
            .delete_by_key(ctx, &tenant, key)
            .await
            .with_context(|| format!("while deleting label definition with key {}", key))?;
        Ok(def)
    }

    /// Adds a formation name to the tenant's scenarios enum, creating the definition on first use.
    pub async fn add_scenario(&self, ctx: &RequestContext, tenant: &str, name: &str) -> Result<()> {
        match self.definitions.get_by_key(ctx, tenant, SCENARIOS_KEY).await {
            Ok(mut def) => {
                let mut names = def.scenario_names();
                if names.iter().any(|n| n == name) {
                    return Ok(());
                }
                names.push(name.to_string());
                def.schema = Some(scenarios_schema(&names));
                self.definitions
                    .update(ctx, &def)
                    .await
                    .context("while updating scenarios label definition")
            }
            Err(err) if is_not_found_error(&err) => {
                let def = scenarios_definition(self.uid.generate(), tenant.to_string(), &[name.to_string()]);
                self.definitions
                    .create(ctx, &def)
                    .await
                    .context("while creating scenarios label definition")
            }
            Err(err) => Err(err.context("while getting scenarios label definition")),
        }
    }

    pub async fn remove_scenario(&self, ctx: &RequestContext, tenant: &str, name: &str) -> Result<()> {
        let mut def = match self.definitions.get_by_key(ctx, tenant, SCENARIOS_KEY).await {
            Ok(def) => def,
            Err(err) if is_not_found_error(&err) => return Ok(()),
            Err(err) => return Err(err.context("while getting scenarios label definition")),
        };

        let names: Vec<String> = def.scenario_names().into_iter().filter(|n| n != name).collect();
        def.schema = Some(scenarios_schema(&names));
        self.definitions
            .update(ctx, &def)
            .await
            .context("while updating scenarios label definition")
    }
}
