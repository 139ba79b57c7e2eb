pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod files;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod roster;
pub mod routes;
pub mod state;
pub mod utils;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hackforge API",
        version = "1.0.0",
        description = "API for the Hackforge hackathon platform"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::hackathon::create_hackathon,
        handlers::hackathon::list_hackathons,
        handlers::hackathon::get_hackathon,
        handlers::hackathon::update_hackathon,
        handlers::hackathon::delete_hackathon,
        handlers::hackathon::transition_hackathon,
        handlers::hackathon::register_for_hackathon,
        handlers::hackathon::get_roster,
        handlers::submission::create_submission,
        handlers::submission::list_submissions,
        handlers::submission::get_submission,
        handlers::submission::update_submission,
        handlers::submission::finalize_submission,
        handlers::submission::delete_submission,
        handlers::submission::list_submission_files,
        handlers::team::create_team,
        handlers::team::join_team,
    ),
    tags(
        (name = "Auth", description = "Authentication and account management"),
        (name = "Hackathons", description = "Hackathon lifecycle, registration and roster"),
        (name = "Submissions", description = "Submission drafting, finalization and file access"),
        (name = "Teams", description = "Hackathon-scoped teams"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(cfg.max_age));

    if cfg.allow_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}
