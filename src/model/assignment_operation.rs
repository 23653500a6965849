use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOperationType {
    Assign,
    Unassign,
}

impl std::fmt::Display for AssignmentOperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AssignmentOperationType::Assign => write!(f, "ASSIGN"),
            AssignmentOperationType::Unassign => write!(f, "UNASSIGN"),
        }
    }
}

impl std::str::FromStr for AssignmentOperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSIGN" => Ok(AssignmentOperationType::Assign),
            "UNASSIGN" => Ok(AssignmentOperationType::Unassign),
            _ => Err(format!("unknown assignment operation type: {}", s)),
        }
    }
}

/// What caused an operation to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationTrigger {
    Assign,
    Unassign,
    Reset,
    Resync,
}

impl std::fmt::Display for OperationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OperationTrigger::Assign => write!(f, "ASSIGN"),
            OperationTrigger::Unassign => write!(f, "UNASSIGN"),
            OperationTrigger::Reset => write!(f, "RESET"),
            OperationTrigger::Resync => write!(f, "RESYNC"),
        }
    }
}

impl std::str::FromStr for OperationTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSIGN" => Ok(OperationTrigger::Assign),
            "UNASSIGN" => Ok(OperationTrigger::Unassign),
            "RESET" => Ok(OperationTrigger::Reset),
            "RESYNC" => Ok(OperationTrigger::Resync),
            _ => Err(format!("unknown operation trigger: {}", s)),
        }
    }
}

/// History entry of an (un)assign processed for one formation assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOperation {
    pub id: Id,
    pub op_type: AssignmentOperationType,
    pub formation_assignment_id: Id,
    pub formation_id: Id,
    pub triggered_by: OperationTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl AssignmentOperation {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOperationInput {
    pub op_type: AssignmentOperationType,
    pub formation_assignment_id: Id,
    pub formation_id: Id,
    pub triggered_by: OperationTrigger,
}

impl AssignmentOperationInput {
    pub fn to_model(&self, id: Id, started_at: DateTime<Utc>) -> AssignmentOperation {
        AssignmentOperation {
            id,
            op_type: self.op_type,
            formation_assignment_id: self.formation_assignment_id.clone(),
            formation_id: self.formation_id.clone(),
            triggered_by: self.triggered_by,
            started_at,
            finished_at: None,
        }
    }
}
