//! statwox-api
//!
//! HTTP surface of StatWoX: accounts, survey authoring, response
//! submission, analytics, likes, comments and CSV export over axum. Every
//! JSON body uses the `{success, message?, data?}` envelope.

pub mod audit_trail;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
pub mod webhook;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// The full router with request logging and permissive CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/surveys/{id}", get(routes::surveys::get_survey))
        .route(
            "/api/surveys/{id}/respond",
            post(routes::responses::submit_response),
        )
        .route("/api/surveys/{id}/like", get(routes::likes::like_status))
        .route(
            "/api/surveys/{id}/comments",
            get(routes::comments::list_comments),
        );

    let protected = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/surveys",
            get(routes::surveys::list_surveys).post(routes::surveys::create_survey),
        )
        .route(
            "/api/surveys/{id}",
            patch(routes::surveys::update_survey).delete(routes::surveys::delete_survey),
        )
        .route(
            "/api/surveys/{id}/publish",
            patch(routes::surveys::publish_survey),
        )
        .route(
            "/api/surveys/{id}/unpublish",
            patch(routes::surveys::unpublish_survey),
        )
        .route(
            "/api/surveys/{id}/close",
            patch(routes::surveys::close_survey),
        )
        .route(
            "/api/surveys/{id}/comments",
            post(routes::comments::create_comment),
        )
        .route(
            "/api/comments/{id}",
            patch(routes::comments::update_comment).delete(routes::comments::delete_comment),
        )
        .route(
            "/api/surveys/{id}/like",
            post(routes::likes::like_survey).delete(routes::likes::unlike_survey),
        )
        .route(
            "/api/surveys/{id}/analytics",
            get(routes::analytics::get_analytics),
        )
        .route(
            "/api/surveys/{id}/analytics/nps",
            get(routes::analytics::get_nps),
        )
        .route(
            "/api/surveys/{id}/analytics/funnel",
            get(routes::analytics::get_funnel),
        )
        .route(
            "/api/surveys/{id}/analytics/crosstab",
            get(routes::analytics::get_crosstab),
        )
        .route(
            "/api/surveys/{id}/export/csv",
            get(routes::export::export_csv),
        )
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    public
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
