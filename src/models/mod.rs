//! Entity schemas: field shapes, defaults and constraints for every stored
//! collection. Schemas are strict; payload fields they do not declare are
//! dropped before anything is written.

pub mod catalog;
pub mod user;
pub mod version;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::{Collection, StoreError};

pub use catalog::{AltProgram, Application, CatalogEntry, Program};
pub use user::User;
pub use version::UpdateDocument;

/// Every collection the service writes to.
pub const COLLECTIONS: &[Collection] = &[
    <User as Entity>::COLLECTION,
    <Program as Entity>::COLLECTION,
    <AltProgram as Entity>::COLLECTION,
    <Application as Entity>::COLLECTION,
];

/// Field constraint violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{model} validation failed: {path}: Path `{path}` is required.")]
    Required { model: &'static str, path: &'static str },

    #[error("{model} validation failed: {path}: Path `{path}` (`{value}`) is shorter than the minimum allowed length ({min}).")]
    TooShort {
        model: &'static str,
        path: &'static str,
        value: String,
        min: usize,
    },

    #[error("{model} validation failed: {path}: Path `{path}` (`{value}`) is longer than the maximum allowed length ({max}).")]
    TooLong {
        model: &'static str,
        path: &'static str,
        value: String,
        max: usize,
    },

    #[error("{model} validation failed: {message}")]
    Cast { model: &'static str, message: String },
}

/// Length bounds for a string path, counted in characters.
#[derive(Debug, Clone, Copy)]
pub struct StringRule {
    pub path: &'static str,
    pub min: usize,
    pub max: usize,
}

impl StringRule {
    pub const fn new(path: &'static str, min: usize, max: usize) -> Self {
        Self { path, min, max }
    }

    /// Required paths reject empty strings.
    pub fn required(&self, model: &'static str, value: &str) -> Result<(), SchemaError> {
        if value.is_empty() {
            return Err(SchemaError::Required {
                model,
                path: self.path,
            });
        }
        self.bounds(model, value)
    }

    pub fn optional(&self, model: &'static str, value: Option<&str>) -> Result<(), SchemaError> {
        match value {
            Some(value) => self.bounds(model, value),
            None => Ok(()),
        }
    }

    fn bounds(&self, model: &'static str, value: &str) -> Result<(), SchemaError> {
        let len = value.chars().count();
        if len < self.min {
            return Err(SchemaError::TooShort {
                model,
                path: self.path,
                value: value.to_string(),
                min: self.min,
            });
        }
        if len > self.max {
            return Err(SchemaError::TooLong {
                model,
                path: self.path,
                value: value.to_string(),
                max: self.max,
            });
        }
        Ok(())
    }
}

/// A schema bound to a collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Model name used in validation messages.
    const MODEL: &'static str;

    /// Lower-case noun used in handler messages, e.g. "program".
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    /// Capitalised noun for update/delete confirmations, e.g. "Program".
    const TITLE: &'static str;

    /// Noun naming the target in update/delete messages.
    const TARGET: &'static str = Self::SINGULAR;

    /// Wire names of every declared path.
    const FIELDS: &'static [&'static str];

    fn validate(&self) -> Result<(), SchemaError>;

    /// Cast a JSON payload onto the schema, applying defaults.
    fn from_payload(payload: Value) -> Result<Self, SchemaError> {
        serde_json::from_value(payload).map_err(|e| SchemaError::Cast {
            model: Self::MODEL,
            message: e.to_string(),
        })
    }

    fn from_body(body: &Map<String, Value>) -> Result<Self, SchemaError> {
        Self::from_payload(Value::Object(body.clone()))
    }

    /// Document body as stored, holding only declared paths.
    fn to_body(&self) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::InvalidUpdate(format!(
                "{} did not serialize to an object: {}",
                Self::MODEL,
                other
            ))),
        }
    }

    /// Cast and validate a merged body before it replaces a stored one.
    fn check_body(body: &Map<String, Value>) -> Result<(), StoreError> {
        Self::from_body(body)?.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: StringRule = StringRule::new("name", 5, 100);

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(NAME.required("Program", &"a".repeat(5)).is_ok());
        assert!(NAME.required("Program", &"a".repeat(100)).is_ok());
        assert!(matches!(
            NAME.required("Program", &"a".repeat(4)),
            Err(SchemaError::TooShort { min: 5, .. })
        ));
        assert!(matches!(
            NAME.required("Program", &"a".repeat(101)),
            Err(SchemaError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(NAME.required("Program", "ééééé").is_ok());
    }

    #[test]
    fn required_rejects_empty_strings() {
        let err = NAME.required("Program", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Program validation failed: name: Path `name` is required."
        );
    }

    #[test]
    fn optional_skips_missing_values() {
        assert!(NAME.optional("Program", None).is_ok());
        assert!(NAME.optional("Program", Some("abc")).is_err());
    }

    #[test]
    fn collections_are_distinct() {
        let mut names: Vec<_> = COLLECTIONS.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COLLECTIONS.len());
    }
}
