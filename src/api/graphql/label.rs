use async_graphql::{Context, InputObject, Json, Object, Result, SimpleObject};
use serde_json::Value;

use super::scalars::Labels;
use super::{services, transact, transact_optional};
use crate::model;

#[derive(SimpleObject, Debug, Clone)]
pub struct Label {
    pub key: String,
    pub value: Json<Value>,
}

impl From<model::Label> for Label {
    fn from(label: model::Label) -> Self {
        Self {
            key: label.key,
            value: Json(label.value),
        }
    }
}

/// Folds the labels of one object into the `Labels` scalar.
pub(super) fn labels_map(labels: Vec<model::Label>) -> Labels {
    Labels(labels.into_iter().map(|l| (l.key, l.value)).collect())
}

#[derive(SimpleObject, Debug, Clone)]
pub struct LabelDefinition {
    pub key: String,
    pub schema: Option<Json<Value>>,
}

impl From<model::LabelDefinition> for LabelDefinition {
    fn from(def: model::LabelDefinition) -> Self {
        Self {
            key: def.key,
            schema: def.schema.map(Json),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct LabelDefinitionInput {
    pub key: String,
    pub schema: Option<Json<Value>>,
}

impl From<LabelDefinitionInput> for model::LabelDefinitionInput {
    fn from(input: LabelDefinitionInput) -> Self {
        Self {
            key: input.key,
            schema: input.schema.map(|s| s.0),
        }
    }
}

#[derive(Default)]
pub struct LabelDefinitionQuery;

#[Object]
impl LabelDefinitionQuery {
    async fn label_definitions(&self, ctx: &Context<'_>) -> Result<Vec<LabelDefinition>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let defs = svc.label_definitions.list(&tx).await?;
            Ok(defs.into_iter().map(LabelDefinition::from).collect())
        })
        .await
    }

    async fn label_definition(&self, ctx: &Context<'_>, key: String) -> Result<Option<LabelDefinition>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.label_definitions.get(&tx, &key).await.map(LabelDefinition::from)
        })
        .await
    }
}

#[derive(Default)]
pub struct LabelDefinitionMutation;

#[Object]
impl LabelDefinitionMutation {
    async fn create_label_definition(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "in")] input: LabelDefinitionInput,
    ) -> Result<LabelDefinition> {
        let svc = services(ctx)?;
        let input = model::LabelDefinitionInput::from(input);
        transact(ctx, |tx| async move {
            svc.label_definitions.create(&tx, &input).await.map(LabelDefinition::from)
        })
        .await
    }

    async fn update_label_definition(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "in")] input: LabelDefinitionInput,
    ) -> Result<LabelDefinition> {
        let svc = services(ctx)?;
        let input = model::LabelDefinitionInput::from(input);
        transact(ctx, |tx| async move {
            svc.label_definitions.update(&tx, &input).await.map(LabelDefinition::from)
        })
        .await
    }

    async fn delete_label_definition(
        &self,
        ctx: &Context<'_>,
        key: String,
        #[graphql(default = false)] delete_related_labels: bool,
    ) -> Result<LabelDefinition> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.label_definitions
                .delete(&tx, &key, delete_related_labels)
                .await
                .map(LabelDefinition::from)
        })
        .await
    }
}
