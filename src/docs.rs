//! OpenAPI document served at `/aa-api/openapi.json` and rendered by Swagger
//! UI at `/aa-api/docs`. Paths are relative to the `/aa-api` server URL.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{alt_programs, applications, programs, root, users};
use crate::middleware::TOKEN_HEADER;
use crate::models::{CatalogEntry, Program};
use crate::validation::{LoginInfo, RegistrationInfo};

pub const DOCS_PATH: &str = "/aa-api/docs";
pub const OPENAPI_PATH: &str = "/aa-api/openapi.json";

/// Registers the `auth-token` header scheme used by protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKeyAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                TOKEN_HEADER,
                "Token issued by POST /user/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Alternative Apps API",
        description = "Catalog of programs, their alternatives and submitted applications."
    ),
    servers((url = "/aa-api", description = "API base path")),
    paths(
        root::root,
        root::health,
        users::register,
        users::login,
        programs::create,
        programs::list,
        programs::get_by_id,
        programs::query,
        programs::update_by_id,
        programs::delete_by_id,
        alt_programs::create,
        alt_programs::list,
        alt_programs::get_by_id,
        alt_programs::update_by_id,
        alt_programs::delete_by_id,
        applications::create,
    ),
    components(schemas(CatalogEntry, Program, RegistrationInfo, LoginInfo)),
    tags(
        (name = "root", description = "Service status"),
        (name = "user", description = "Registration and login"),
        (name = "programs", description = "Program catalog"),
        (name = "alt-programs", description = "Alternative programs"),
        (name = "applications", description = "Submitted applications")
    )
)]
pub struct ApiDoc;
