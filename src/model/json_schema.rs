//! JSON schema compilation and validation for label definitions and package input params.

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::apperrors::AppError;

/// Compiles `schema`; an uncompilable schema is invalid data.
pub fn compile(schema: &Value) -> Result<Validator, AppError> {
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|err| AppError::InvalidData(format!("while compiling json schema: {}", err)))
}

/// Parses and compiles a schema given as a JSON string.
pub fn compile_str(schema: &str) -> Result<Validator, AppError> {
    let schema: Value = serde_json::from_str(schema)
        .map_err(|err| AppError::InvalidData(format!("json schema is not a valid JSON: {}", err)))?;
    compile(&schema)
}

/// Validates `value` against a compiled schema, listing every violation.
pub fn validate(validator: &Validator, value: &Value) -> Result<(), AppError> {
    if validator.is_valid(value) {
        return Ok(());
    }
    let reasons: Vec<String> = validator.iter_errors(value).map(|err| err.to_string()).collect();
    Err(AppError::InvalidData(format!(
        "value does not satisfy the schema: {}",
        reasons.join("; ")
    )))
}
