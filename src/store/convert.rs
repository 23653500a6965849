//! Helpers shared by the model ⇄ entity converters.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marshals an optional value into a nullable JSON text column.
pub fn marshal<T: Serialize>(value: Option<&T>, what: &str) -> Result<Option<String>> {
    value
        .map(|v| serde_json::to_string(v).with_context(|| format!("while marshalling {}", what)))
        .transpose()
}

/// Unmarshals a nullable JSON text column.
pub fn unmarshal<T: DeserializeOwned>(value: Option<&str>, what: &str) -> Result<Option<T>> {
    value
        .map(|v| serde_json::from_str(v).with_context(|| format!("while unmarshalling {}", what)))
        .transpose()
}

/// Parses an enum stored as its canonical string.
pub fn parse_enum<T: FromStr<Err = String>>(value: &str) -> Result<T> {
    value.parse::<T>().map_err(|err| anyhow!(err))
}
