use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::web::{AppState, auth, contact, events, gallery, pages, submit};

// Matches the original deployment's 200MB upload ceiling.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::landing_page))
        .route("/about", get(pages::about_page))
        .route("/events", get(events::events_page))
        .route("/partners", get(pages::partners_page))
        .route(
            "/gallery",
            get(gallery::gallery_page),
        )
        .route(
            "/submit",
            get(submit::submit_page).post(submit::process_submit),
        )
        .route(
            "/contact",
            get(contact::contact_page).post(contact::process_contact),
        )
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/signup", get(auth::signup_page).post(auth::process_signup))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
