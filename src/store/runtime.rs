use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Page, Runtime, RuntimeStatus};
use crate::store::convert::parse_enum;
use crate::store::repo::{
    Condition, Creator, Deleter, Entity, ExistQuerier, PageableQuerier, SingleGetter, Updater, Value,
};
use crate::store::traits::RuntimeRepository;

pub const RUNTIME_TABLE: &str = "public.runtimes";

const COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "name",
    "description",
    "status_condition",
    "status_timestamp",
    "creation_timestamp",
];

const UPDATABLE_COLUMNS: &[&str] = &["name", "description", "status_condition", "status_timestamp"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RuntimeEntity {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status_condition: String,
    pub status_timestamp: DateTime<Utc>,
    pub creation_timestamp: DateTime<Utc>,
}

impl Entity for RuntimeEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            ("status_condition", self.status_condition.clone().into()),
            ("status_timestamp", self.status_timestamp.into()),
            ("creation_timestamp", self.creation_timestamp.into()),
        ]
    }
}

impl RuntimeEntity {
    pub fn from_model(runtime: &Runtime) -> Self {
        Self {
            id: runtime.id.clone(),
            tenant_id: runtime.tenant.clone(),
            name: runtime.name.clone(),
            description: runtime.description.clone(),
            status_condition: runtime.status.condition.to_string(),
            status_timestamp: runtime.status.timestamp,
            creation_timestamp: runtime.creation_timestamp,
        }
    }

    pub fn into_model(self) -> Result<Runtime> {
        Ok(Runtime {
            id: self.id,
            tenant: self.tenant_id,
            name: self.name,
            description: self.description,
            status: RuntimeStatus {
                condition: parse_enum(&self.status_condition)?,
                timestamp: self.status_timestamp,
            },
            creation_timestamp: self.creation_timestamp,
        })
    }
}

pub struct PgRuntimeRepository {
    creator: Creator,
    getter: SingleGetter,
    exist_querier: ExistQuerier,
    page_querier: PageableQuerier,
    updater: Updater,
    deleter: Deleter,
}

impl PgRuntimeRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Runtime;
        Self {
            creator: Creator::new(resource, RUNTIME_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, RUNTIME_TABLE, "tenant_id", COLUMNS),
            exist_querier: ExistQuerier::new(resource, RUNTIME_TABLE, "tenant_id"),
            page_querier: PageableQuerier::new(resource, RUNTIME_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, RUNTIME_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, RUNTIME_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgRuntimeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RuntimeRepository for PgRuntimeRepository {
    async fn create(&self, ctx: &RequestContext, runtime: &Runtime) -> Result<()> {
        self.creator
            .create(ctx, &RuntimeEntity::from_model(runtime))
            .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Runtime> {
        let entity: RuntimeEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn exists(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool> {
        self.exist_querier
            .exists(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Runtime>> {
        self.page_querier
            .list::<RuntimeEntity>(ctx, tenant, page_size, cursor, "name", vec![])
            .await?
            .into_models(RuntimeEntity::into_model)
    }

    async fn update(&self, ctx: &RequestContext, runtime: &Runtime) -> Result<()> {
        self.updater
            .update_single(ctx, &runtime.tenant, &RuntimeEntity::from_model(runtime))
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
    use crate::model::RuntimeStatusCondition;

    #[test]
    fn test_entity_conversion_round_trip() {
        let now = Utc::now();
        let runtime = Runtime {
            id: "rt".to_string(),
            tenant: "tenant".to_string(),
            name: "runtime".to_string(),
            description: None,
            status: RuntimeStatus {
                condition: RuntimeStatusCondition::Connected,
                timestamp: now,
            },
            creation_timestamp: now,
        };

        let entity = RuntimeEntity::from_model(&runtime);
        assert_eq!(entity.status_condition, "CONNECTED");
        assert_eq!(entity.into_model().unwrap(), runtime);
    }
}
