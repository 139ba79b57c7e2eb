use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/submissions", submission_routes())
        .nest("/teams", team_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn hackathon_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::hackathon::list_hackathons).post(handlers::hackathon::create_hackathon),
        )
        .route(
            "/{id}",
            get(handlers::hackathon::get_hackathon)
                .patch(handlers::hackathon::update_hackathon)
                .delete(handlers::hackathon::delete_hackathon),
        )
        .route("/{id}/status", post(handlers::hackathon::transition_hackathon))
        .route(
            "/{id}/register",
            post(handlers::hackathon::register_for_hackathon),
        )
        .route("/{id}/participants", get(handlers::hackathon::get_roster))
        .route("/{id}/teams", post(handlers::team::create_team))
        .route(
            "/{id}/submissions",
            get(handlers::submission::list_submissions)
                .post(handlers::submission::create_submission),
        )
}

fn submission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(handlers::submission::get_submission)
                .patch(handlers::submission::update_submission)
                .delete(handlers::submission::delete_submission),
        )
        .route(
            "/{id}/submit",
            post(handlers::submission::finalize_submission),
        )
        .route(
            "/{id}/files",
            get(handlers::submission::list_submission_files),
        )
}

fn team_routes() -> Router<AppState> {
    Router::new().route("/{id}/join", post(handlers::team::join_team))
}
