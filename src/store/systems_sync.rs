use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::SystemSynchronizationTimestamp;
use crate::store::repo::{Entity, Lister, Upserter, Value};
use crate::store::traits::SystemsSyncRepository;

pub const SYSTEMS_SYNC_TABLE: &str = "public.systems_sync_timestamps";

const COLUMNS: &[&str] = &["id", "tenant_id", "product_id", "last_sync_timestamp"];
const CONFLICTING_COLUMNS: &[&str] = &["tenant_id", "product_id"];
const UPDATABLE_COLUMNS: &[&str] = &["last_sync_timestamp"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SystemSynchronizationTimestampEntity {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub last_sync_timestamp: DateTime<Utc>,
}

impl Entity for SystemSynchronizationTimestampEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("product_id", self.product_id.clone().into()),
            ("last_sync_timestamp", self.last_sync_timestamp.into()),
        ]
    }
}

impl SystemSynchronizationTimestampEntity {
    pub fn from_model(item: &SystemSynchronizationTimestamp) -> Self {
        Self {
            id: item.id.clone(),
            tenant_id: item.tenant_id.clone(),
            product_id: item.product_id.clone(),
            last_sync_timestamp: item.last_sync_timestamp,
        }
    }

    pub fn into_model(self) -> SystemSynchronizationTimestamp {
        SystemSynchronizationTimestamp {
            id: self.id,
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            last_sync_timestamp: self.last_sync_timestamp,
        }
    }
}

pub struct PgSystemsSyncRepository {
    lister: Lister,
    upserter: Upserter,
}

impl PgSystemsSyncRepository {
    pub fn new() -> Self {
        let resource = ResourceType::SystemsSyncTimestamp;
        Self {
            lister: Lister::new(resource, SYSTEMS_SYNC_TABLE, "tenant_id", COLUMNS),
            upserter: Upserter::new(
                resource,
                SYSTEMS_SYNC_TABLE,
                COLUMNS,
                CONFLICTING_COLUMNS,
                UPDATABLE_COLUMNS,
            ),
        }
    }
}

impl Default for PgSystemsSyncRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SystemsSyncRepository for PgSystemsSyncRepository {
    async fn list(&self, ctx: &RequestContext, tenant: &str) -> Result<Vec<SystemSynchronizationTimestamp>> {
        let entities: Vec<SystemSynchronizationTimestampEntity> =
            self.lister.list(ctx, tenant, vec![], "product_id").await?;
        Ok(entities
            .into_iter()
            .map(SystemSynchronizationTimestampEntity::into_model)
            .collect())
    }

    async fn upsert(&self, ctx: &RequestContext, item: &SystemSynchronizationTimestamp) -> Result<()> {
        self.upserter
            .upsert(ctx, &SystemSynchronizationTimestampEntity::from_model(item))
            .await?;
        Ok(())
    }
}
