use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::store::StoreError;

/// Name of the per-document write counter on the wire.
pub const VERSION_KEY: &str = "__v";

/// Name of the document identifier on the wire.
pub const ID_KEY: &str = "_id";

/// A named document collection plus the body fields that must be unique in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub name: &'static str,
    pub unique: &'static [&'static str],
}

impl Collection {
    pub const fn new(name: &'static str) -> Self {
        Self { name, unique: &[] }
    }

    pub const fn with_unique(name: &'static str, unique: &'static [&'static str]) -> Self {
        Self { name, unique }
    }
}

/// A persisted document: generated id, write counter and the schema fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(rename = "__v")]
    pub version: i64,
}

impl StoredDocument {
    pub fn new(body: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            body,
            version: 0,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}

/// Parse a document id taken from a request path.
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
