use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::auth::{Auth, AuthInput};
use crate::model::common::{validate_description, validate_required};
use crate::model::Id;

const PACKAGE_NAME_MAX_LENGTH: usize = 100;

/// A grouping of API and Event definitions exposed by an Application (a.k.a. Bundle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: Id,
    pub tenant: String,
    pub application_id: Id,
    pub name: String,
    pub description: Option<String>,
    /// JSON schema the input params of instance auth requests must satisfy
    pub instance_auth_request_input_schema: Option<String>,
    pub default_instance_auth: Option<Auth>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageCreateInput {
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_input_schema: Option<String>,
    pub default_instance_auth: Option<AuthInput>,
}

impl PackageCreateInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_package_fields(&self.name, self.description.as_deref())
    }

    pub fn to_package(&self, id: Id, application_id: Id, tenant: String) -> Package {
        Package {
            id,
            tenant,
            application_id,
            name: self.name.clone(),
            description: self.description.clone(),
            instance_auth_request_input_schema: self.instance_auth_request_input_schema.clone(),
            default_instance_auth: self.default_instance_auth.as_ref().map(AuthInput::to_auth),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageUpdateInput {
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_input_schema: Option<String>,
    pub default_instance_auth: Option<AuthInput>,
}

impl PackageUpdateInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_package_fields(&self.name, self.description.as_deref())
    }
}

fn validate_package_fields(name: &str, description: Option<&str>) -> Result<(), AppError> {
    validate_required("name", name)?;
    if name.chars().count() > PACKAGE_NAME_MAX_LENGTH {
        return Err(AppError::InvalidData(format!(
            "name: the length must be no more than {}",
            PACKAGE_NAME_MAX_LENGTH
        )));
    }
    validate_description(description)
}

impl Package {
    pub fn set_from_update_input(&mut self, input: &PackageUpdateInput) {
        self.name = input.name.clone();
        self.description = input.description.clone();
        self.instance_auth_request_input_schema = input.instance_auth_request_input_schema.clone();
        self.default_instance_auth = input.default_instance_auth.as_ref().map(AuthInput::to_auth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::auth::{BasicCredentialDataInput, CredentialDataInput};

    #[test]
    fn test_to_package_converts_default_auth() {
        let input = PackageCreateInput {
            name: "pkg".to_string(),
            default_instance_auth: Some(AuthInput {
                credential: Some(CredentialDataInput {
                    basic: Some(BasicCredentialDataInput {
                        username: "u".to_string(),
                        password: "p".to_string(),
                    }),
                    oauth: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let pkg = input.to_package("id".to_string(), "app".to_string(), "tenant".to_string());
        assert_eq!(pkg.application_id, "app");
        let auth = pkg.default_instance_auth.unwrap();
        assert_eq!(auth.credential.basic.unwrap().username, "u");
    }

    #[test]
    fn test_validate() {
        assert!(PackageCreateInput::default().validate().is_err());
        let long = PackageCreateInput {
            name: "x".repeat(101),
            ..Default::default()
        };
        assert!(long.validate().is_err());
    }
}
