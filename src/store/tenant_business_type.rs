use anyhow::Result;

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::TenantBusinessType;
use crate::store::repo::{Condition, Creator, Entity, Lister, SingleGetter, Value};
use crate::store::traits::TenantBusinessTypeRepository;

pub const TENANT_BUSINESS_TYPE_TABLE: &str = "public.tenant_business_types";

const COLUMNS: &[&str] = &["id", "code", "name"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TenantBusinessTypeEntity {
    pub id: String,
    pub code: String,
    pub name: String,
}

impl Entity for TenantBusinessTypeEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("code", self.code.clone().into()),
            ("name", self.name.clone().into()),
        ]
    }
}

impl From<&TenantBusinessType> for TenantBusinessTypeEntity {
    fn from(value: &TenantBusinessType) -> Self {
        Self {
            id: value.id.clone(),
            code: value.code.clone(),
            name: value.name.clone(),
        }
    }
}

impl From<TenantBusinessTypeEntity> for TenantBusinessType {
    fn from(value: TenantBusinessTypeEntity) -> Self {
        Self {
            id: value.id,
            code: value.code,
            name: value.name,
        }
    }
}

/// Business types are a global lookup table without a tenant column.
pub struct PgTenantBusinessTypeRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
}

impl PgTenantBusinessTypeRepository {
    pub fn new() -> Self {
        let resource = ResourceType::TenantBusinessType;
        let table = TENANT_BUSINESS_TYPE_TABLE;
        Self {
            creator: Creator::new(resource, table, COLUMNS),
            getter: SingleGetter::new_global(resource, table, COLUMNS),
            lister: Lister::new_global(resource, table, COLUMNS),
        }
    }
}

impl Default for PgTenantBusinessTypeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TenantBusinessTypeRepository for PgTenantBusinessTypeRepository {
    async fn create(&self, ctx: &RequestContext, item: &TenantBusinessType) -> Result<()> {
        self.creator
            .create(ctx, &TenantBusinessTypeEntity::from(item))
            .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<TenantBusinessType> {
        let entity: TenantBusinessTypeEntity = self
            .getter
            .get_global(ctx, vec![Condition::eq("id", id)])
            .await?;
        Ok(entity.into())
    }

    async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<TenantBusinessType>> {
        let entities: Vec<TenantBusinessTypeEntity> =
            self.lister.list_global(ctx, vec![], "code").await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }
}
