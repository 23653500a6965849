use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::apperrors::AppError;
use crate::model::common::{validate_label_key, SCENARIO_NAME_MAX_LENGTH, SCENARIO_NAME_PATTERN};
use crate::model::json_schema;
use crate::model::label::SCENARIOS_KEY;
use crate::model::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub id: Id,
    pub tenant: String,
    pub key: String,
    pub schema: Option<Value>,
}

impl LabelDefinition {
    /// Formation names allowed by a `scenarios` definition.
    pub fn scenario_names(&self) -> Vec<String> {
        self.schema
            .as_ref()
            .and_then(|schema| schema.pointer("/items/enum"))
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelDefinitionInput {
    pub key: String,
    pub schema: Option<Value>,
}

impl LabelDefinitionInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_label_key(&self.key)?;
        if let Some(schema) = &self.schema {
            json_schema::compile(schema)?;
        }
        Ok(())
    }

    pub fn to_label_definition(&self, id: Id, tenant: String) -> LabelDefinition {
        LabelDefinition {
            id,
            tenant,
            key: self.key.clone(),
            schema: self.schema.clone(),
        }
    }
}

/// Schema of the `scenarios` label for the given formation names.
pub fn scenarios_schema(names: &[String]) -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "uniqueItems": true,
        "items": {
            "type": "string",
            "pattern": SCENARIO_NAME_PATTERN,
            "maxLength": SCENARIO_NAME_MAX_LENGTH,
            "enum": names,
        },
    })
}

pub fn scenarios_definition(id: Id, tenant: String, names: &[String]) -> LabelDefinition {
    LabelDefinition {
        id,
        tenant,
        key: SCENARIOS_KEY.to_string(),
        schema: Some(scenarios_schema(names)),
    }
}
