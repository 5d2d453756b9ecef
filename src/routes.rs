//! Router composition. Every route lives under `/aa-api`.

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE, ORIGIN},
        HeaderName, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::{ApiDoc, DOCS_PATH, OPENAPI_PATH};
use crate::handlers::{alt_programs, applications, programs, root, users};
use crate::middleware::{require_token, TOKEN_HEADER};
use crate::state::AppState;

pub const BASE_PATH: &str = "/aa-api";

fn path(suffix: &str) -> String {
    format!("{}{}", BASE_PATH, suffix)
}

pub fn app(state: AppState) -> Router {
    let gate = from_fn_with_state(state.clone(), require_token);

    Router::new()
        // Public
        .route(BASE_PATH, get(root::root))
        .route(&path("/"), get(root::root))
        .route(&path("/health"), get(root::health))
        .route(&path("/user/register"), post(users::register))
        .route(&path("/user/login"), post(users::login))
        .route(&path("/applications"), post(applications::create))
        // Programs: reads are public, writes need a token
        .route(
            &path("/programs"),
            post(programs::create).route_layer(gate.clone()).get(programs::list),
        )
        .route(
            &path("/programs/:id"),
            put(programs::update_by_id)
                .delete(programs::delete_by_id)
                .route_layer(gate.clone())
                .get(programs::get_by_id),
        )
        .route(&path("/programs/query/:key/:val"), get(programs::query))
        // Alternative programs
        .route(
            &path("/alt-programs"),
            post(alt_programs::create).route_layer(gate.clone()).get(alt_programs::list),
        )
        .route(
            &path("/alt-programs/:id"),
            put(alt_programs::update_by_id)
                .delete(alt_programs::delete_by_id)
                .route_layer(gate)
                .get(alt_programs::get_by_id),
        )
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        // Global middleware
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin is echoed back so credentialed requests are accepted.
fn cors() -> CorsLayer {
    let token = HeaderName::from_static(TOKEN_HEADER);

    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::OPTIONS,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([
            token.clone(),
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
        ])
        .expose_headers([token])
}
