//! Custom GraphQL scalars.

use std::collections::HashMap;

use async_graphql::{InputValueError, InputValueResult, Name, Scalar, ScalarType, Value};
use chrono::{DateTime, Utc};

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Boolean(_) => "bool",
        Value::Binary(_) => "binary",
        Value::Enum(_) => "enum",
        Value::List(_) => "list",
        Value::Object(_) => "object",
    }
}

fn unexpected<T: async_graphql::InputType>(value: &Value, expected: &str) -> InputValueError<T> {
    InputValueError::custom(format!(
        "unexpected input type: {}, should be {}",
        kind(value),
        expected
    ))
}

/// RFC3339 date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub DateTime<Utc>);

#[Scalar(name = "Timestamp")]
impl ScalarType for Timestamp {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| Timestamp(ts.with_timezone(&Utc)))
                .map_err(|err| InputValueError::custom(format!("invalid timestamp {}: {}", s, err))),
            _ => Err(unexpected(&value, "string")),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

/// Label key to arbitrary JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels(pub HashMap<String, serde_json::Value>);

#[Scalar(name = "Labels")]
impl ScalarType for Labels {
    fn parse(value: Value) -> InputValueResult<Self> {
        let Value::Object(_) = &value else {
            return Err(unexpected(&value, "map[string]interface{}"));
        };
        match value.into_json()? {
            serde_json::Value::Object(map) => Ok(Labels(map.into_iter().collect())),
            _ => Err(InputValueError::custom(
                "unexpected input type: object, should be map[string]interface{}",
            )),
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (Name::new(k), Value::from_json(v.clone()).unwrap_or(Value::Null)))
                .collect(),
        )
    }
}

fn parse_multimap(value: Value) -> Result<HashMap<String, Vec<String>>, String> {
    let expected = "map[string][]string";
    let unexpected = |value: &Value| format!("unexpected input type: {}, should be {}", kind(value), expected);

    let map = match value {
        Value::Object(map) => map,
        other => return Err(unexpected(&other)),
    };
    let mut out = HashMap::with_capacity(map.len());
    for (name, values) in map {
        let items = match values {
            Value::List(items) => items,
            other => return Err(unexpected(&other)),
        };
        let strings = items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(unexpected(&other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        out.insert(name.to_string(), strings);
    }
    Ok(out)
}

fn multimap_to_value(map: &HashMap<String, Vec<String>>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, values)| {
                (
                    Name::new(k),
                    Value::List(values.iter().cloned().map(Value::String).collect()),
                )
            })
            .collect(),
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpHeaders(pub HashMap<String, Vec<String>>);

#[Scalar(name = "HttpHeaders")]
impl ScalarType for HttpHeaders {
    fn parse(value: Value) -> InputValueResult<Self> {
        parse_multimap(value)
            .map(HttpHeaders)
            .map_err(InputValueError::custom)
    }

    fn to_value(&self) -> Value {
        multimap_to_value(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(pub HashMap<String, Vec<String>>);

#[Scalar(name = "QueryParams")]
impl ScalarType for QueryParams {
    fn parse(value: Value) -> InputValueResult<Self> {
        parse_multimap(value)
            .map(QueryParams)
            .map_err(InputValueError::custom)
    }

    fn to_value(&self) -> Value {
        multimap_to_value(&self.0)
    }
}

macro_rules! string_scalar {
    ($ty:ident, $name:literal) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $ty(pub String);

        #[Scalar(name = $name)]
        impl ScalarType for $ty {
            fn parse(value: Value) -> InputValueResult<Self> {
                match value {
                    Value::String(s) => Ok($ty(s)),
                    other => Err(unexpected(&other, "string")),
                }
            }

            fn to_value(&self) -> Value {
                Value::String(self.0.clone())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                $ty(value)
            }
        }
    };
}

string_scalar!(Clob, "CLOB");
string_scalar!(PageCursor, "PageCursor");
string_scalar!(Tenant, "Tenant");
