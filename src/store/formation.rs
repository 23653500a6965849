use anyhow::Result;

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Formation, FormationError, Page};
use crate::store::convert::{marshal, parse_enum, unmarshal};
use crate::store::repo::{Condition, Creator, Deleter, Entity, PageableQuerier, SingleGetter, Updater, Value};
use crate::store::traits::FormationRepository;

pub const FORMATION_TABLE: &str = "public.formations";

const COLUMNS: &[&str] = &["id", "tenant_id", "name", "state", "error"];

const UPDATABLE_COLUMNS: &[&str] = &["name", "state", "error"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FormationEntity {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub state: String,
    pub error: Option<String>,
}

impl Entity for FormationEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("name", self.name.clone().into()),
            ("state", self.state.clone().into()),
            ("error", self.error.clone().into()),
        ]
    }
}

impl FormationEntity {
    pub fn from_model(formation: &Formation) -> Result<Self> {
        Ok(Self {
            id: formation.id.clone(),
            tenant_id: formation.tenant.clone(),
            name: formation.name.clone(),
            state: formation.state.to_string(),
            error: marshal(formation.error.as_ref(), "formation error")?,
        })
    }

    pub fn into_model(self) -> Result<Formation> {
        let error: Option<FormationError> = unmarshal(self.error.as_deref(), "formation error")?;
        Ok(Formation {
            id: self.id,
            tenant: self.tenant_id,
            name: self.name,
            state: parse_enum(&self.state)?,
            error,
        })
    }
}

pub struct PgFormationRepository {
    creator: Creator,
    getter: SingleGetter,
    page_querier: PageableQuerier,
    updater: Updater,
    deleter: Deleter,
}

impl PgFormationRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Formation;
        Self {
            creator: Creator::new(resource, FORMATION_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, FORMATION_TABLE, "tenant_id", COLUMNS),
            page_querier: PageableQuerier::new(resource, FORMATION_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, FORMATION_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, FORMATION_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgFormationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FormationRepository for PgFormationRepository {
    async fn create(&self, ctx: &RequestContext, formation: &Formation) -> Result<()> {
        self.creator
            .create(ctx, &FormationEntity::from_model(formation)?)
            .await
    }

    async fn get(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Formation> {
        let entity: FormationEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn get_by_name(&self, ctx: &RequestContext, tenant: &str, name: &str) -> Result<Formation> {
        let entity: FormationEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("name", name)])
            .await?;
        entity.into_model()
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Formation>> {
        self.page_querier
            .list::<FormationEntity>(ctx, tenant, page_size, cursor, "name", vec![])
            .await?
            .into_models(FormationEntity::into_model)
    }

    async fn update(&self, ctx: &RequestContext, formation: &Formation) -> Result<()> {
        self.updater
            .update_single(ctx, &formation.tenant, &FormationEntity::from_model(formation)?)
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }
}
