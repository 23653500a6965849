use std::sync::Arc;

use anyhow::{Context, Result};

use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::{Id, TenantBusinessType, TenantBusinessTypeInput};
use crate::store::traits::TenantBusinessTypeRepository;

/// Business types are global: no tenant is required to read or create them.
pub struct TenantBusinessTypeService {
    repo: Arc<dyn TenantBusinessTypeRepository>,
    uid: Arc<dyn UidService>,
}

impl TenantBusinessTypeService {
    pub fn new(repo: Arc<dyn TenantBusinessTypeRepository>, uid: Arc<dyn UidService>) -> Self {
        Self { repo, uid }
    }

    pub async fn create(&self, ctx: &RequestContext, input: &TenantBusinessTypeInput) -> Result<Id> {
        input.validate()?;
        let id = self.uid.generate();
        self.repo
            .create(ctx, &input.to_model(id.clone()))
            .await
            .with_context(|| format!("while creating tenant business type with code {}", input.code))?;
        log::debug!("created tenant business type {} with code {}", id, input.code);
        Ok(id)
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<TenantBusinessType> {
        self.repo
            .get_by_id(ctx, id)
            .await
            .with_context(|| format!("while getting tenant business type with id {}", id))
    }

    pub async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<TenantBusinessType>> {
        self.repo
            .list_all(ctx)
            .await
            .context("while listing tenant business types")
    }
}
