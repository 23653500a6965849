use std::sync::LazyLock;

use regex::Regex;

use crate::apperrors::AppError;

pub type Id = String;

static DNS_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid DNS subdomain pattern")
});

static LABEL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_.]+$").expect("valid label key pattern"));

/// Pattern every scenario (formation) name has to match.
pub const SCENARIO_NAME_PATTERN: &str = r"^[A-Za-z0-9]([-_A-Za-z0-9\s]*[A-Za-z0-9])$";

static SCENARIO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCENARIO_NAME_PATTERN).expect("valid scenario name pattern"));

const DNS_SUBDOMAIN_MAX_LENGTH: usize = 253;
const LABEL_KEY_MAX_LENGTH: usize = 256;
pub const SCENARIO_NAME_MAX_LENGTH: usize = 128;
const DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Names of applications and runtimes must be valid DNS-1123 subdomains.
pub fn validate_dns_subdomain(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() || value.len() > DNS_SUBDOMAIN_MAX_LENGTH || !DNS_SUBDOMAIN.is_match(value) {
        return Err(AppError::InvalidData(format!(
            "{}: must be a valid DNS subdomain (lower case alphanumerics, '-' or '.', at most {} characters)",
            field, DNS_SUBDOMAIN_MAX_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_label_key(key: &str) -> Result<(), AppError> {
    if key.is_empty() || key.len() > LABEL_KEY_MAX_LENGTH || !LABEL_KEY.is_match(key) {
        return Err(AppError::InvalidData(format!(
            "key: label key {:?} must match {} and be at most {} characters",
            key,
            LABEL_KEY.as_str(),
            LABEL_KEY_MAX_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_scenario_name(name: &str) -> Result<(), AppError> {
    if name.len() > SCENARIO_NAME_MAX_LENGTH || !SCENARIO_NAME.is_match(name) {
        return Err(AppError::InvalidData(format!(
            "name: {:?} must match {} and be at most {} characters",
            name, SCENARIO_NAME_PATTERN, SCENARIO_NAME_MAX_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidData(format!("{}: cannot be blank", field)));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LENGTH => Err(AppError::InvalidData(format!(
            "description: the length must be no more than {}",
            DESCRIPTION_MAX_LENGTH
        ))),
        _ => Ok(()),
    }
}
