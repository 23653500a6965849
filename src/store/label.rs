use anyhow::{anyhow, Result};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Label, LabelableObject};
use crate::store::repo::{Condition, Creator, Deleter, Entity, Lister, SingleGetter, Updater, Value};
use crate::store::traits::LabelRepository;

pub const LABEL_TABLE: &str = "public.labels";

const COLUMNS: &[&str] = &["id", "tenant_id", "key", "value", "app_id", "runtime_id"];

const UPDATABLE_COLUMNS: &[&str] = &["value"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LabelEntity {
    pub id: String,
    pub tenant_id: String,
    pub key: String,
    pub value: serde_json::Value,
    pub app_id: Option<String>,
    pub runtime_id: Option<String>,
}

impl Entity for LabelEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("key", self.key.clone().into()),
            ("value", self.value.clone().into()),
            ("app_id", self.app_id.clone().into()),
            ("runtime_id", self.runtime_id.clone().into()),
        ]
    }
}

impl LabelEntity {
    pub fn from_model(label: &Label) -> Self {
        let (app_id, runtime_id) = match label.object_type {
            LabelableObject::Application => (Some(label.object_id.clone()), None),
            LabelableObject::Runtime => (None, Some(label.object_id.clone())),
        };
        Self {
            id: label.id.clone(),
            tenant_id: label.tenant.clone(),
            key: label.key.clone(),
            value: label.value.clone(),
            app_id,
            runtime_id,
        }
    }

    pub fn into_model(self) -> Result<Label> {
        let (object_id, object_type) = match (self.app_id, self.runtime_id) {
            (Some(app_id), None) => (app_id, LabelableObject::Application),
            (None, Some(runtime_id)) => (runtime_id, LabelableObject::Runtime),
            _ => return Err(anyhow!("label {} must reference exactly one object", self.id)),
        };
        Ok(Label {
            id: self.id,
            tenant: self.tenant_id,
            key: self.key,
            value: self.value,
            object_id,
            object_type,
        })
    }
}

pub struct PgLabelRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
    updater: Updater,
    deleter: Deleter,
}

impl PgLabelRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Label;
        Self {
            creator: Creator::new(resource, LABEL_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, LABEL_TABLE, "tenant_id", COLUMNS),
            lister: Lister::new(resource, LABEL_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, LABEL_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, LABEL_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgLabelRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LabelRepository for PgLabelRepository {
    async fn create(&self, ctx: &RequestContext, label: &Label) -> Result<()> {
        self.creator.create(ctx, &LabelEntity::from_model(label)).await
    }

    async fn update(&self, ctx: &RequestContext, label: &Label) -> Result<()> {
        self.updater
            .update_single(ctx, &label.tenant, &LabelEntity::from_model(label))
            .await
    }

    async fn get_by_key(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<Label> {
        let entity: LabelEntity = self
            .getter
            .get(
                ctx,
                tenant,
                vec![
                    Condition::eq("key", key),
                    Condition::eq(object_type.id_column(), object_id),
                ],
            )
            .await?;
        entity.into_model()
    }

    async fn list_for_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
    ) -> Result<Vec<Label>> {
        let entities: Vec<LabelEntity> = self
            .lister
            .list(
                ctx,
                tenant,
                vec![Condition::eq(object_type.id_column(), object_id)],
                "key",
            )
            .await?;
        entities.into_iter().map(LabelEntity::into_model).collect()
    }

    async fn list_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<Vec<Label>> {
        let entities: Vec<LabelEntity> = self
            .lister
            .list(ctx, tenant, vec![Condition::eq("key", key)], "id")
            .await?;
        entities.into_iter().map(LabelEntity::into_model).collect()
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<()> {
        self.deleter
            .delete_one(
                ctx,
                tenant,
                vec![
                    Condition::eq("key", key),
                    Condition::eq(object_type.id_column(), object_id),
                ],
            )
            .await
    }

    async fn delete_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<u64> {
        self.deleter
            .delete_many(ctx, tenant, vec![Condition::eq("key", key)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_runtime_label_round_trip() {
        let label = Label {
            id: "l".to_string(),
            tenant: "tenant".to_string(),
            key: "scenarios".to_string(),
            value: json!(["DEFAULT"]),
            object_id: "rt".to_string(),
            object_type: LabelableObject::Runtime,
        };

        let entity = LabelEntity::from_model(&label);
        assert_eq!(entity.runtime_id.as_deref(), Some("rt"));
        assert_eq!(entity.app_id, None);
        assert_eq!(entity.into_model().unwrap(), label);
    }
}
