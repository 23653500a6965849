use crate::apperrors::AppError;
use crate::store::persistence::Persistence;
use crate::tenant::TenantCtx;

/// Per-request values threaded through services and repositories.
///
/// Cloning is cheap: the open transaction is shared, not copied.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    tenant: Option<TenantCtx>,
    persistence: Option<Persistence>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: TenantCtx) -> Self {
        self.tenant = Some(tenant);
        self
    }

    /// Returns a copy of this context bound to the given transaction
    pub fn with_persistence(&self, persistence: Persistence) -> Self {
        Self {
            tenant: self.tenant.clone(),
            persistence: Some(persistence),
        }
    }

    pub fn tenant(&self) -> Option<&TenantCtx> {
        self.tenant.as_ref()
    }

    pub fn persistence(&self) -> Result<&Persistence, AppError> {
        self.persistence
            .as_ref()
            .ok_or_else(|| AppError::Internal("unable to fetch database from context".to_string()))
    }
}
