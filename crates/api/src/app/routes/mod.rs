use axum::{routing::get, Router};

pub mod admin;
pub mod bom;
pub mod common;
pub mod parts;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/parts", parts::router())
        .nest("/bom", bom::router())
        .nest("/admin", admin::router())
}
