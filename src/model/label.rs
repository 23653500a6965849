use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::apperrors::AppError;
use crate::model::common::validate_label_key;
use crate::model::formation::FormationObjectType;
use crate::model::Id;

/// Reserved label key listing the formations an object belongs to.
pub const SCENARIOS_KEY: &str = "scenarios";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelableObject {
    Application,
    Runtime,
}

impl LabelableObject {
    /// Column holding the id of the labeled object
    pub fn id_column(self) -> &'static str {
        match self {
            LabelableObject::Application => "app_id",
            LabelableObject::Runtime => "runtime_id",
        }
    }
}

impl std::fmt::Display for LabelableObject {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LabelableObject::Application => write!(f, "Application"),
            LabelableObject::Runtime => write!(f, "Runtime"),
        }
    }
}

impl From<FormationObjectType> for LabelableObject {
    fn from(value: FormationObjectType) -> Self {
        match value {
            FormationObjectType::Application => LabelableObject::Application,
            FormationObjectType::Runtime => LabelableObject::Runtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: Id,
    pub tenant: String,
    pub key: String,
    pub value: Value,
    pub object_id: Id,
    pub object_type: LabelableObject,
}

impl Label {
    pub fn scenarios(&self) -> Result<Vec<String>, AppError> {
        parse_scenarios(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelInput {
    pub key: String,
    pub value: Value,
    pub object_id: Id,
    pub object_type: LabelableObject,
}

impl LabelInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_label_key(&self.key)
    }

    pub fn to_label(&self, id: Id, tenant: String) -> Label {
        Label {
            id,
            tenant,
            key: self.key.clone(),
            value: self.value.clone(),
            object_id: self.object_id.clone(),
            object_type: self.object_type,
        }
    }
}

/// Reads the value of a `scenarios` label.
pub fn parse_scenarios(value: &Value) -> Result<Vec<String>, AppError> {
    let invalid = || AppError::InvalidData("scenarios label value must be an array of strings".to_string());
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}
