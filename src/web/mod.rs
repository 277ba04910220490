pub mod auth;
pub mod contact;
pub mod data;
pub mod events;
pub mod gallery;
pub mod models;
pub mod pages;
pub mod router;
pub mod state;
pub mod submit;
pub mod templates;
pub mod uploads;

pub use auth::{AuthUser, SESSION_COOKIE, SESSION_TTL_HOURS};
pub use state::AppState;
pub use templates::escape_html;
