use crate::apperrors::AppError;
use crate::context::RequestContext;

/// Tenant resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantCtx {
    /// Identifier used to scope every row in the database
    pub internal_id: String,
    /// Identifier the caller knows the tenant by
    pub external_id: String,
}

impl TenantCtx {
    pub fn new(internal_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            external_id: external_id.into(),
        }
    }
}

/// Returns the internal tenant id carried by the context.
pub fn load_from_context(ctx: &RequestContext) -> Result<String, AppError> {
    let tenant = ctx.tenant().ok_or(AppError::CannotReadTenant)?;
    if tenant.internal_id.is_empty() {
        return Err(AppError::TenantRequired);
    }
    Ok(tenant.internal_id.clone())
}
