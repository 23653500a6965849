use serde::{Deserialize, Serialize};

use crate::model::formation::FormationObjectType;
use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationAssignmentType {
    Application,
    Runtime,
    RuntimeContext,
}

impl std::fmt::Display for FormationAssignmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormationAssignmentType::Application => write!(f, "APPLICATION"),
            FormationAssignmentType::Runtime => write!(f, "RUNTIME"),
            FormationAssignmentType::RuntimeContext => write!(f, "RUNTIME_CONTEXT"),
        }
    }
}

impl std::str::FromStr for FormationAssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPLICATION" => Ok(FormationAssignmentType::Application),
            "RUNTIME" => Ok(FormationAssignmentType::Runtime),
            "RUNTIME_CONTEXT" => Ok(FormationAssignmentType::RuntimeContext),
            _ => Err(format!("unknown formation assignment type: {}", s)),
        }
    }
}

impl From<FormationObjectType> for FormationAssignmentType {
    fn from(value: FormationObjectType) -> Self {
        match value {
            FormationObjectType::Application => FormationAssignmentType::Application,
            FormationObjectType::Runtime => FormationAssignmentType::Runtime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationAssignmentState {
    Initial,
    Ready,
    ConfigPending,
    CreateError,
    DeleteError,
    Deleting,
}

impl std::fmt::Display for FormationAssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormationAssignmentState::Initial => write!(f, "INITIAL"),
            FormationAssignmentState::Ready => write!(f, "READY"),
            FormationAssignmentState::ConfigPending => write!(f, "CONFIG_PENDING"),
            FormationAssignmentState::CreateError => write!(f, "CREATE_ERROR"),
            FormationAssignmentState::DeleteError => write!(f, "DELETE_ERROR"),
            FormationAssignmentState::Deleting => write!(f, "DELETING"),
        }
    }
}

impl std::str::FromStr for FormationAssignmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(FormationAssignmentState::Initial),
            "READY" => Ok(FormationAssignmentState::Ready),
            "CONFIG_PENDING" => Ok(FormationAssignmentState::ConfigPending),
            "CREATE_ERROR" => Ok(FormationAssignmentState::CreateError),
            "DELETE_ERROR" => Ok(FormationAssignmentState::DeleteError),
            "DELETING" => Ok(FormationAssignmentState::Deleting),
            _ => Err(format!("unknown formation assignment state: {}", s)),
        }
    }
}

/// Directed relationship between two participants of a formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationAssignment {
    pub id: Id,
    pub formation_id: Id,
    pub tenant: String,
    pub source: Id,
    pub source_type: FormationAssignmentType,
    pub target: Id,
    pub target_type: FormationAssignmentType,
    pub state: FormationAssignmentState,
    pub value: Option<serde_json::Value>,
}

impl FormationAssignment {
    pub fn involves(&self, object_id: &str) -> bool {
        self.source == object_id || self.target == object_id
    }

    pub fn is_self_assignment(&self) -> bool {
        self.source == self.target
    }
}

/// One side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Id,
    pub object_type: FormationAssignmentType,
}

impl Participant {
    pub fn new(id: impl Into<Id>, object_type: FormationAssignmentType) -> Self {
        Self {
            id: id.into(),
            object_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormationAssignmentInput {
    pub formation_id: Id,
    pub source: Participant,
    pub target: Participant,
    pub state: FormationAssignmentState,
    pub value: Option<serde_json::Value>,
}

impl FormationAssignmentInput {
    pub fn to_model(&self, id: Id, tenant: String) -> FormationAssignment {
        FormationAssignment {
            id,
            formation_id: self.formation_id.clone(),
            tenant,
            source: self.source.id.clone(),
            source_type: self.source.object_type,
            target: self.target.id.clone(),
            target_type: self.target.object_type,
            state: self.state,
            value: self.value.clone(),
        }
    }
}

/// Inputs for every assignment a new participant takes part in: one in each direction
/// with every existing participant plus the self assignment.
pub fn assignment_inputs_for(
    formation_id: &str,
    joining: &Participant,
    existing: &[Participant],
) -> Vec<FormationAssignmentInput> {
    let input = |source: &Participant, target: &Participant| FormationAssignmentInput {
        formation_id: formation_id.to_string(),
        source: source.clone(),
        target: target.clone(),
        state: if source == target {
            FormationAssignmentState::Ready
        } else {
            FormationAssignmentState::Initial
        },
        value: None,
    };

    let mut inputs = vec![input(joining, joining)];
    for other in existing.iter().filter(|p| p.id != joining.id) {
        inputs.push(input(joining, other));
        inputs.push(input(other, joining));
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_inputs_for_first_participant() {
        let app = Participant::new("app", FormationAssignmentType::Application);
        let inputs = assignment_inputs_for("f", &app, &[]);

        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].source, app);
        assert_eq!(inputs[0].target, app);
        assert_eq!(inputs[0].state, FormationAssignmentState::Ready);
    }

    #[test]
    fn test_assignment_inputs_are_pairwise() {
        let app = Participant::new("app", FormationAssignmentType::Application);
        let rt = Participant::new("rt", FormationAssignmentType::Runtime);
        let other = Participant::new("other", FormationAssignmentType::Application);

        let inputs = assignment_inputs_for("f", &app, &[rt.clone(), other.clone(), app.clone()]);
        assert_eq!(inputs.len(), 5);
        assert!(inputs
            .iter()
            .any(|i| i.source == app && i.target == rt && i.state == FormationAssignmentState::Initial));
        assert!(inputs.iter().any(|i| i.source == rt && i.target == app));
        assert!(inputs.iter().any(|i| i.source == other && i.target == app));
    }

    #[test]
    fn test_state_parses_from_screaming_case() {
        assert_eq!(
            "CONFIG_PENDING".parse::<FormationAssignmentState>(),
            Ok(FormationAssignmentState::ConfigPending)
        );
    }
}
