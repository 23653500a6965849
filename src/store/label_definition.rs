use anyhow::Result;

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::LabelDefinition;
use crate::store::repo::{
    Condition, Creator, Deleter, Entity, ExistQuerier, Lister, SingleGetter, Updater, Value,
};
use crate::store::traits::LabelDefinitionRepository;

pub const LABEL_DEFINITION_TABLE: &str = "public.label_definitions";

const COLUMNS: &[&str] = &["id", "tenant_id", "key", "schema"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LabelDefinitionEntity {
    pub id: String,
    pub tenant_id: String,
    pub key: String,
    pub schema: Option<serde_json::Value>,
}

impl Entity for LabelDefinitionEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("key", self.key.clone().into()),
            ("schema", self.schema.clone().into()),
        ]
    }
}

impl LabelDefinitionEntity {
    pub fn from_model(def: &LabelDefinition) -> Self {
        Self {
            id: def.id.clone(),
            tenant_id: def.tenant.clone(),
            key: def.key.clone(),
            schema: def.schema.clone(),
        }
    }

    pub fn into_model(self) -> LabelDefinition {
        LabelDefinition {
            id: self.id,
            tenant: self.tenant_id,
            key: self.key,
            schema: self.schema,
        }
    }
}

pub struct PgLabelDefinitionRepository {
    creator: Creator,
    getter: SingleGetter,
    exist_querier: ExistQuerier,
    lister: Lister,
    updater: Updater,
    deleter: Deleter,
}

impl PgLabelDefinitionRepository {
    pub fn new() -> Self {
        let resource = ResourceType::LabelDefinition;
        let table = LABEL_DEFINITION_TABLE;
        Self {
            creator: Creator::new(resource, table, COLUMNS),
            getter: SingleGetter::new(resource, table, "tenant_id", COLUMNS),
            exist_querier: ExistQuerier::new(resource, table, "tenant_id"),
            lister: Lister::new(resource, table, "tenant_id", COLUMNS),
            updater: Updater::new(resource, table, "tenant_id", &["schema"]),
            deleter: Deleter::new(resource, table, "tenant_id"),
        }
    }
}

impl Default for PgLabelDefinitionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LabelDefinitionRepository for PgLabelDefinitionRepository {
    async fn create(&self, ctx: &RequestContext, def: &LabelDefinition) -> Result<()> {
        self.creator
            .create(ctx, &LabelDefinitionEntity::from_model(def))
            .await
    }

    async fn get_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<LabelDefinition> {
        let entity: LabelDefinitionEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("key", key)])
            .await?;
        Ok(entity.into_model())
    }

    async fn exists(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<bool> {
        self.exist_querier
            .exists(ctx, tenant, vec![Condition::eq("key", key)])
            .await
    }

    async fn list(&self, ctx: &RequestContext, tenant: &str) -> Result<Vec<LabelDefinition>> {
        let entities: Vec<LabelDefinitionEntity> =
            self.lister.list(ctx, tenant, vec![], "key").await?;
        Ok(entities
            .into_iter()
            .map(LabelDefinitionEntity::into_model)
            .collect())
    }

    async fn update(&self, ctx: &RequestContext, def: &LabelDefinition) -> Result<()> {
        self.updater
            .update_single(ctx, &def.tenant, &LabelDefinitionEntity::from_model(def))
            .await
    }

    async fn delete_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("key", key)])
            .await
    }
}
