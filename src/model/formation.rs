use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;
use crate::model::common::validate_scenario_name;
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationState {
    Initial,
    Ready,
    CreateError,
    DeleteError,
    Deleting,
}

impl std::fmt::Display for FormationState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormationState::Initial => write!(f, "INITIAL"),
            FormationState::Ready => write!(f, "READY"),
            FormationState::CreateError => write!(f, "CREATE_ERROR"),
            FormationState::DeleteError => write!(f, "DELETE_ERROR"),
            FormationState::Deleting => write!(f, "DELETING"),
        }
    }
}

impl std::str::FromStr for FormationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(FormationState::Initial),
            "READY" => Ok(FormationState::Ready),
            "CREATE_ERROR" => Ok(FormationState::CreateError),
            "DELETE_ERROR" => Ok(FormationState::DeleteError),
            "DELETING" => Ok(FormationState::Deleting),
            _ => Err(format!("unknown formation state: {}", s)),
        }
    }
}

/// Last error reported for a formation; stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationError {
    pub message: String,
    pub error_code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub id: Id,
    pub tenant: String,
    pub name: String,
    pub state: FormationState,
    pub error: Option<FormationError>,
}

impl Formation {
    pub fn is_ready(&self) -> bool {
        self.state == FormationState::Ready
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormationInput {
    pub name: String,
}

impl FormationInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_scenario_name(&self.name)
    }

    pub fn to_formation(&self, id: Id, tenant: String, state: FormationState) -> Formation {
        Formation {
            id,
            tenant,
            name: self.name.clone(),
            state,
            error: None,
        }
    }
}

/// Kind of object assigned to a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationObjectType {
    Application,
    Runtime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_formation() {
        let input = FormationInput {
            name: "my-scenario".to_string(),
        };
        assert!(input.validate().is_ok());

        let formation = input.to_formation("id".to_string(), "tenant".to_string(), FormationState::Ready);
        assert!(formation.is_ready());
        assert!(formation.error.is_none());
    }

    #[test]
    fn test_state_parsing() {
        for state in [
            FormationState::Initial,
            FormationState::Ready,
            FormationState::CreateError,
            FormationState::DeleteError,
            FormationState::Deleting,
        ] {
            assert_eq!(state.to_string().parse::<FormationState>(), Ok(state));
        }
        assert!("ready".parse::<FormationState>().is_err());
    }

    #[test]
    fn test_invalid_name() {
        let input = FormationInput {
            name: "-scenario".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
