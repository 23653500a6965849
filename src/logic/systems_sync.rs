use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::SystemSynchronizationTimestamp;
use crate::store::traits::SystemsSyncRepository;
use crate::tenant;

pub struct SystemsSyncService {
    repo: Arc<dyn SystemsSyncRepository>,
    uid: Arc<dyn UidService>,
}

impl SystemsSyncService {
    pub fn new(repo: Arc<dyn SystemsSyncRepository>, uid: Arc<dyn UidService>) -> Self {
        Self { repo, uid }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<SystemSynchronizationTimestamp>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.repo
            .list(ctx, &tenant)
            .await
            .with_context(|| format!("while listing systems sync timestamps of tenant {}", tenant))
    }

    /// Stores the timestamp of `product_id` for the caller's tenant; an id is generated when absent.
    pub async fn upsert(
        &self,
        ctx: &RequestContext,
        product_id: &str,
        last_sync_timestamp: DateTime<Utc>,
    ) -> Result<SystemSynchronizationTimestamp> {
        let tenant = tenant::load_from_context(ctx)?;
        let item = SystemSynchronizationTimestamp {
            id: self.uid.generate(),
            tenant_id: tenant,
            product_id: product_id.to_string(),
            last_sync_timestamp,
        };
        self.repo.upsert(ctx, &item).await.with_context(|| {
            format!(
                "while upserting systems sync timestamp for tenant {} and product {}",
                item.tenant_id, item.product_id
            )
        })?;
        Ok(item)
    }
}
