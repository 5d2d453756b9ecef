//! Write-counter handling for update-by-id.
//!
//! Clients may send a `__v` value at the top level or inside `$set` /
//! `$setOnInsert` / `$inc`; all of them are discarded and the stored counter
//! is incremented by exactly one. There is no comparison against an expected
//! prior version, so the last write wins.

use serde_json::{Map, Value};

use crate::database::document::{ID_KEY, VERSION_KEY};
use crate::database::StoreError;

/// Accepted spellings of stored paths, as `(alias, path)`.
const FIELD_ALIASES: &[(&str, &str)] = &[("createdBy", "_createdBy")];

/// A prepared update: field assignments plus the counter bump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDocument {
    set: Map<String, Value>,
}

fn operator_fields(operator: &str, value: Value) -> Result<Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(StoreError::InvalidUpdate(format!(
            "Modifiers operate on fields but we found type {} instead for {}",
            json_type(&other),
            operator
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl UpdateDocument {
    /// Strip every client-supplied version value. `$inc` only ever moves the
    /// counter, so increments of other paths are dropped.
    pub fn prepare(raw: Value) -> Result<Self, StoreError> {
        let mut raw = match raw {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidUpdate(format!(
                    "update must be an object, got {}",
                    json_type(&other)
                )))
            }
        };
        raw.remove(VERSION_KEY);

        let mut update = Self::default();
        for (key, value) in raw {
            match key.as_str() {
                "$set" => {
                    for (field, value) in operator_fields(&key, value)? {
                        update.assign(field, value);
                    }
                }
                // Upserts are never issued, so these never apply.
                "$setOnInsert" => {
                    operator_fields(&key, value)?;
                }
                "$inc" => {
                    operator_fields(&key, value)?;
                }
                op if op.starts_with('$') => return Err(StoreError::UnsupportedOperator(op.to_string())),
                _ => update.assign(key, value),
            }
        }

        Ok(update)
    }

    /// Aliases resolve to their stored path; an explicit path wins over its alias.
    fn assign(&mut self, field: String, value: Value) {
        if field == VERSION_KEY {
            return;
        }
        match FIELD_ALIASES.iter().find(|(alias, _)| *alias == field) {
            Some((_, path)) => {
                self.set.entry(path.to_string()).or_insert(value);
            }
            None => {
                self.set.insert(field, value);
            }
        }
    }

    /// Keep only assignments to declared schema paths; `_id` is immutable.
    pub fn retain_fields(mut self, fields: &[&str]) -> Self {
        self.set
            .retain(|field, _| field != ID_KEY && fields.contains(&field.as_str()));
        self
    }

    /// Apply to a stored body and counter in place.
    pub fn apply(&self, body: &mut Map<String, Value>, version: &mut i64) {
        for (field, value) in &self.set {
            body.insert(field.clone(), value.clone());
        }
        *version += 1;
    }

    #[cfg(test)]
    fn assignments(&self) -> &Map<String, Value> {
        &self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> Map<String, Value> {
        match json!({"name": "Old name", "country": "US"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn strips_top_level_version() {
        let update = UpdateDocument::prepare(json!({"name": "New name", "__v": 0})).unwrap();
        assert!(!update.assignments().contains_key("__v"));
        assert_eq!(update.assignments().len(), 1);
    }

    #[test]
    fn strips_version_nested_under_operators() {
        let update = UpdateDocument::prepare(json!({
            "$set": {"__v": 99, "country": "DK"},
            "$setOnInsert": {"__v": 5},
            "$inc": {"__v": 50}
        }))
        .unwrap();

        assert_eq!(update.assignments().get("country"), Some(&json!("DK")));
        assert!(!update.assignments().contains_key("__v"));

        let mut body = stored();
        let mut version = 2;
        update.apply(&mut body, &mut version);
        assert_eq!(version, 3);
    }

    #[test]
    fn stored_counter_moves_by_exactly_one() {
        let update = UpdateDocument::prepare(json!({"name": "New name", "__v": -7})).unwrap();
        let mut body = stored();
        let mut version = 3;
        update.apply(&mut body, &mut version);

        assert_eq!(version, 4);
        assert_eq!(body.get("name"), Some(&json!("New name")));
        assert_eq!(body.get("country"), Some(&json!("US")));
        assert!(!body.contains_key("__v"));
    }

    #[test]
    fn set_and_top_level_fields_merge() {
        let update = UpdateDocument::prepare(json!({"name": "A name", "$set": {"logo": "b.png"}})).unwrap();
        assert_eq!(update.assignments().len(), 2);
    }

    #[test]
    fn created_by_alias_maps_to_stored_path() {
        let update = UpdateDocument::prepare(json!({"createdBy": "u2"}))
            .unwrap()
            .retain_fields(&["name", "_createdBy"]);
        assert_eq!(update.assignments().get("_createdBy"), Some(&json!("u2")));
        assert!(!update.assignments().contains_key("createdBy"));

        let update = UpdateDocument::prepare(json!({"$set": {"createdBy": "u3"}})).unwrap();
        assert_eq!(update.assignments().get("_createdBy"), Some(&json!("u3")));
    }

    #[test]
    fn explicit_path_wins_over_alias() {
        let update = UpdateDocument::prepare(json!({"createdBy": "alias", "_createdBy": "path"})).unwrap();
        assert_eq!(update.assignments().get("_createdBy"), Some(&json!("path")));
    }

    #[test]
    fn increments_of_other_paths_are_dropped() {
        let update = UpdateDocument::prepare(json!({"$inc": {"name": 1, "__v": 9}})).unwrap();
        assert!(update.assignments().is_empty());

        let mut body = stored();
        let mut version = 0;
        update.apply(&mut body, &mut version);
        assert_eq!(version, 1);
        assert_eq!(body.get("name"), Some(&json!("Old name")));
    }

    #[test]
    fn rejects_unknown_operators() {
        let err = UpdateDocument::prepare(json!({"$unset": {"name": ""}})).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedOperator(op) if op == "$unset"));
    }

    #[test]
    fn rejects_non_object_updates() {
        assert!(UpdateDocument::prepare(json!(["name"])).is_err());
        assert!(UpdateDocument::prepare(json!({"$set": 4})).is_err());
        assert!(UpdateDocument::prepare(json!({"$inc": "x"})).is_err());
    }

    #[test]
    fn retain_fields_drops_undeclared_and_id() {
        let update = UpdateDocument::prepare(json!({"name": "x", "_id": "abc", "admin": true}))
            .unwrap()
            .retain_fields(&["name"]);
        assert_eq!(update.assignments().len(), 1);
    }
}
