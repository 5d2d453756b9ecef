//! Registration and login payload rules.
//!
//! Rules are checked key by key in declaration order and only the first
//! failure is reported. Keys the rule set does not declare are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    fn new(key: &str, message: String) -> Self {
        Self {
            key: key.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    key: &'static str,
    min: usize,
    max: usize,
    email: bool,
}

const NAME: FieldRule = FieldRule {
    key: "name",
    min: 6,
    max: 255,
    email: false,
};
const EMAIL: FieldRule = FieldRule {
    key: "email",
    min: 6,
    max: 255,
    email: true,
};
const PASSWORD: FieldRule = FieldRule {
    key: "password",
    min: 6,
    max: 50,
    email: false,
};

const REGISTRATION_RULES: &[FieldRule] = &[NAME, EMAIL, PASSWORD];
const LOGIN_RULES: &[FieldRule] = &[EMAIL, PASSWORD];

/// Body of POST /user/register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationInfo {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of POST /user/login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub email: String,
    pub password: String,
}

pub fn validate_registration(payload: &Value) -> Result<RegistrationInfo, ValidationError> {
    let fields = check(payload, REGISTRATION_RULES)?;
    Ok(RegistrationInfo {
        name: take(&fields, "name"),
        email: take(&fields, "email"),
        password: take(&fields, "password"),
    })
}

pub fn validate_login(payload: &Value) -> Result<LoginInfo, ValidationError> {
    let fields = check(payload, LOGIN_RULES)?;
    Ok(LoginInfo {
        email: take(&fields, "email"),
        password: take(&fields, "password"),
    })
}

fn take(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn check<'a>(payload: &'a Value, rules: &[FieldRule]) -> Result<&'a Map<String, Value>, ValidationError> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationError::new("value", "\"value\" must be of type object".to_string()));
    };

    for rule in rules {
        check_field(rule, fields.get(rule.key))?;
    }

    if let Some(unknown) = fields.keys().find(|k| !rules.iter().any(|r| r.key == k.as_str())) {
        return Err(ValidationError::new(unknown, format!("\"{}\" is not allowed", unknown)));
    }

    Ok(fields)
}

fn check_field(rule: &FieldRule, value: Option<&Value>) -> Result<(), ValidationError> {
    let key = rule.key;
    let value = match value {
        None => return Err(ValidationError::new(key, format!("\"{}\" is required", key))),
        Some(Value::String(s)) => s,
        Some(_) => return Err(ValidationError::new(key, format!("\"{}\" must be a string", key))),
    };

    if value.is_empty() {
        return Err(ValidationError::new(key, format!("\"{}\" is not allowed to be empty", key)));
    }
    if rule.email && !is_valid_email(value) {
        return Err(ValidationError::new(key, format!("\"{}\" must be a valid email", key)));
    }

    let len = value.chars().count();
    if len < rule.min {
        return Err(ValidationError::new(
            key,
            format!("\"{}\" length must be at least {} characters long", key, rule.min),
        ));
    }
    if len > rule.max {
        return Err(ValidationError::new(
            key,
            format!("\"{}\" length must be less than or equal to {} characters long", key, rule.max),
        ));
    }

    Ok(())
}

/// Address check: one `@`, a local part free of whitespace, and a dotted
/// domain whose labels are alphanumeric/hyphen and whose TLD is alphabetic.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || local.chars().any(char::is_whitespace) {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let label_ok = |label: &&str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !labels.iter().all(label_ok) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}
