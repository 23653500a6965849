use std::fmt;

use thiserror::Error;

/// Kind of object an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Application,
    Runtime,
    Package,
    PackageInstanceAuth,
    Webhook,
    Formation,
    FormationAssignment,
    AssignmentOperation,
    Label,
    LabelDefinition,
    SystemsSyncTimestamp,
    TenantBusinessType,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ResourceType::Application => "application",
            ResourceType::Runtime => "runtime",
            ResourceType::Package => "package",
            ResourceType::PackageInstanceAuth => "packageInstanceAuth",
            ResourceType::Webhook => "webhook",
            ResourceType::Formation => "formation",
            ResourceType::FormationAssignment => "formationAssignment",
            ResourceType::AssignmentOperation => "assignmentOperation",
            ResourceType::Label => "label",
            ResourceType::LabelDefinition => "labelDefinition",
            ResourceType::SystemsSyncTimestamp => "systemsSyncTimestamp",
            ResourceType::TenantBusinessType => "tenantBusinessType",
        };
        write!(f, "{}", name)
    }
}

/// Error codes exposed to GraphQL clients in the `error_code` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InternalError,
    NotFound,
    NotUnique,
    InvalidData,
    InvalidOperation,
    TenantRequired,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorCode::InternalError => 10,
            ErrorCode::NotFound => 20,
            ErrorCode::NotUnique => 21,
            ErrorCode::InvalidData => 22,
            ErrorCode::InvalidOperation => 23,
            ErrorCode::TenantRequired => 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Object not found [object={resource}{}]", id_suffix(.id))]
    NotFound {
        resource: ResourceType,
        id: Option<String>,
    },
    #[error("Object is not unique [object={resource}]")]
    NotUnique { resource: ResourceType },
    #[error("Invalid data [reason={0}]")]
    InvalidData(String),
    #[error("The operation is not allowed [reason={0}]")]
    InvalidOperation(String),
    #[error("cannot read tenant from context")]
    CannotReadTenant,
    #[error("Tenant is required")]
    TenantRequired,
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!("; id={}", id),
        None => String::new(),
    }
}

impl AppError {
    pub fn not_found(resource: ResourceType, id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            id: Some(id.into()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::NotUnique { .. } => ErrorCode::NotUnique,
            AppError::InvalidData(_) => ErrorCode::InvalidData,
            AppError::InvalidOperation(_) => ErrorCode::InvalidOperation,
            AppError::CannotReadTenant | AppError::TenantRequired => ErrorCode::TenantRequired,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

/// Looks through the whole context chain for a typed application error.
pub fn find_app_error(err: &anyhow::Error) -> Option<&AppError> {
    err.downcast_ref::<AppError>()
}

pub fn is_not_found_error(err: &anyhow::Error) -> bool {
    matches!(find_app_error(err), Some(AppError::NotFound { .. }))
}

pub fn error_code(err: &anyhow::Error) -> ErrorCode {
    find_app_error(err)
        .map(AppError::code)
        .unwrap_or(ErrorCode::InternalError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_not_found_detected_through_context() {
        let err: anyhow::Result<()> =
            Err(AppError::not_found(ResourceType::Application, "app-1").into());
        let err = err
            .context("while getting application")
            .context("while resolving application")
            .unwrap_err();

        assert!(is_not_found_error(&err));
        assert_eq!(error_code(&err), ErrorCode::NotFound);
        assert_eq!(
            format!("{:#}", err),
            "while resolving application: while getting application: Object not found [object=application; id=app-1]"
        );
    }

    #[test]
    fn test_plain_errors_are_internal() {
        let err = anyhow::anyhow!("boom");
        assert!(!is_not_found_error(&err));
        assert_eq!(error_code(&err), ErrorCode::InternalError);
    }

    #[test]
    fn test_tenant_errors_share_code() {
        assert_eq!(AppError::CannotReadTenant.code(), ErrorCode::TenantRequired);
        assert_eq!(
            AppError::CannotReadTenant.to_string(),
            "cannot read tenant from context"
        );
    }
}
