use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{auth::require_user, state::AppState};

pub mod files;
pub mod health;
pub mod resumes;

pub fn create_router(state: AppState) -> Router<()> {
    let allow_origin = match state.config.cors_allowed_origin.as_ref() {
        Some(origins) => AllowOrigin::list(parse_origins(origins)),
        None => AllowOrigin::mirror_request(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let resume_routes = Router::new()
        .route("/", get(resumes::list_resumes).post(resumes::create_resume))
        .route("/apply", post(resumes::apply_resume))
        .route("/file", post(files::attach_files))
        .route("/file/:resume_id", delete(files::delete_file))
        .route(
            "/:resume_id",
            get(resumes::get_resume)
                .patch(resumes::update_resume)
                .delete(resumes::delete_resume),
        );

    let protected_routes = Router::new()
        .nest("/api/resumes", resume_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(protected_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .filter_map(|value| match value.parse::<HeaderValue>() {
            Ok(header) => Some(header),
            Err(_) => {
                warn!(origin = %value, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
