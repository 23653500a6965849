//! Tenant-wide lookups: business types and system synchronization timestamps.

use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};

use super::scalars::{Tenant, Timestamp};
use super::{services, transact, transact_optional};
use crate::model;

#[derive(SimpleObject, Debug, Clone)]
pub struct TenantBusinessType {
    pub id: ID,
    pub code: String,
    pub name: String,
}

impl From<model::TenantBusinessType> for TenantBusinessType {
    fn from(tbt: model::TenantBusinessType) -> Self {
        Self {
            id: ID(tbt.id),
            code: tbt.code,
            name: tbt.name,
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct TenantBusinessTypeInput {
    pub code: String,
    pub name: String,
}

#[derive(SimpleObject, Debug, Clone)]
pub struct SystemsSyncTimestamp {
    pub tenant: Tenant,
    #[graphql(name = "productID")]
    pub product_id: String,
    pub last_sync_timestamp: Timestamp,
}

impl From<model::SystemSynchronizationTimestamp> for SystemsSyncTimestamp {
    fn from(item: model::SystemSynchronizationTimestamp) -> Self {
        Self {
            tenant: Tenant(item.tenant_id),
            product_id: item.product_id,
            last_sync_timestamp: item.last_sync_timestamp.into(),
        }
    }
}

#[derive(Default)]
pub struct TenantQuery;

#[Object]
impl TenantQuery {
    async fn tenant_business_types(&self, ctx: &Context<'_>) -> Result<Vec<TenantBusinessType>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let items = svc.tenant_business_types.list_all(&tx).await?;
            Ok(items.into_iter().map(TenantBusinessType::from).collect())
        })
        .await
    }

    async fn tenant_business_type(&self, ctx: &Context<'_>, id: ID) -> Result<Option<TenantBusinessType>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.tenant_business_types
                .get_by_id(&tx, &id)
                .await
                .map(TenantBusinessType::from)
        })
        .await
    }

    async fn systems_sync_timestamps(&self, ctx: &Context<'_>) -> Result<Vec<SystemsSyncTimestamp>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let items = svc.systems_sync.list(&tx).await?;
            Ok(items.into_iter().map(SystemsSyncTimestamp::from).collect())
        })
        .await
    }
}

#[derive(Default)]
pub struct TenantMutation;

#[Object]
impl TenantMutation {
    async fn create_tenant_business_type(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "in")] input: TenantBusinessTypeInput,
    ) -> Result<TenantBusinessType> {
        let svc = services(ctx)?;
        let input = model::TenantBusinessTypeInput {
            code: input.code,
            name: input.name,
        };
        transact(ctx, |tx| async move {
            let id = svc.tenant_business_types.create(&tx, &input).await?;
            svc.tenant_business_types
                .get_by_id(&tx, &id)
                .await
                .map(TenantBusinessType::from)
        })
        .await
    }

    /// Records the last synchronization of a product for the calling tenant.
    async fn upsert_systems_sync_timestamp(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "productID")] product_id: String,
        last_sync_timestamp: Timestamp,
    ) -> Result<SystemsSyncTimestamp> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.systems_sync
                .upsert(&tx, &product_id, last_sync_timestamp.0)
                .await
                .map(SystemsSyncTimestamp::from)
        })
        .await
    }
}
