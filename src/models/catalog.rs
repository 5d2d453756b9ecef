use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Entity, SchemaError, StringRule};
use crate::database::Collection;

const NAME: StringRule = StringRule::new("name", 5, 100);
const DESCRIPTION: StringRule = StringRule::new("description", 10, 255);
const LOGO: StringRule = StringRule::new("logo", 1, usize::MAX);
const COUNTRY: StringRule = StringRule::new("country", 1, usize::MAX);

const ENTRY_FIELDS: &[&str] = &["name", "description", "logo", "country", "isHidden", "_createdBy"];

/// Fields shared by every catalog collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub is_hidden: bool,
    /// Id of the user the entry is attributed to, as supplied by the caller.
    #[serde(
        rename = "_createdBy",
        alias = "createdBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by: Option<String>,
}

impl CatalogEntry {
    pub fn validate(&self, model: &'static str) -> Result<(), SchemaError> {
        NAME.required(model, &self.name)?;
        DESCRIPTION.optional(model, self.description.as_deref())?;
        LOGO.required(model, &self.logo)?;
        COUNTRY.required(model, &self.country)?;
        Ok(())
    }
}

/// Top-level catalog entry with an ordered list of alternative program ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub alt_programs: Vec<Uuid>,
}

impl Entity for Program {
    const COLLECTION: Collection = Collection::new("programs");
    const MODEL: &'static str = "Program";
    const SINGULAR: &'static str = "program";
    const PLURAL: &'static str = "programs";
    const TITLE: &'static str = "Program";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "logo",
        "country",
        "isHidden",
        "_createdBy",
        "altPrograms",
    ];

    fn validate(&self) -> Result<(), SchemaError> {
        self.entry.validate(Self::MODEL)
    }
}

/// Alternative or variant entry referenced from programs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AltProgram(pub CatalogEntry);

impl Entity for AltProgram {
    const COLLECTION: Collection = Collection::new("alt_programs");
    const MODEL: &'static str = "AltProgram";
    const SINGULAR: &'static str = "alternative program";
    const PLURAL: &'static str = "alternative programs";
    // Updates and deletes answer as plain programs.
    const TITLE: &'static str = "Program";
    const TARGET: &'static str = "program";
    const FIELDS: &'static [&'static str] = ENTRY_FIELDS;

    fn validate(&self) -> Result<(), SchemaError> {
        self.0.validate(Self::MODEL)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Application(pub CatalogEntry);

impl Entity for Application {
    const COLLECTION: Collection = Collection::new("applications");
    const MODEL: &'static str = "App";
    const SINGULAR: &'static str = "application";
    const PLURAL: &'static str = "applications";
    const TITLE: &'static str = "Application";
    const FIELDS: &'static [&'static str] = ENTRY_FIELDS;

    fn validate(&self) -> Result<(), SchemaError> {
        self.0.validate(Self::MODEL)
    }
}
