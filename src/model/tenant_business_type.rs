use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::common::validate_required;
use crate::model::Id;

/// Global lookup entry describing the business type of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantBusinessType {
    pub id: Id,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TenantBusinessTypeInput {
    pub code: String,
    pub name: String,
}

impl TenantBusinessTypeInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_required("code", &self.code)?;
        validate_required("name", &self.name)
    }

    pub fn to_model(&self, id: Id) -> TenantBusinessType {
        TenantBusinessType {
            id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}
