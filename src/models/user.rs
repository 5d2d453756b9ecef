use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, SchemaError, StringRule};
use crate::database::Collection;

const NAME: StringRule = StringRule::new("name", 6, 200);
const EMAIL: StringRule = StringRule::new("email", 6, 200);
const PASSWORD: StringRule = StringRule::new("password", 8, 200);

/// A registered account. `password` always holds a hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "Utc::now")]
    pub registered_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password: password_hash,
            registered_at: Utc::now(),
        }
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::with_unique("users", &["email"]);
    const MODEL: &'static str = "User";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const TITLE: &'static str = "User";
    const FIELDS: &'static [&'static str] = &["name", "email", "password", "registeredAt"];

    fn validate(&self) -> Result<(), SchemaError> {
        NAME.required(Self::MODEL, &self.name)?;
        EMAIL.required(Self::MODEL, &self.email)?;
        PASSWORD.required(Self::MODEL, &self.password)?;
        Ok(())
    }
}
