//! Admin routes for data maintenance.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use inventree_auth::Permission;

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/migrations", get(list_migrations))
        .route("/migrations/run", post(run_migrations))
        .route("/migrations/fix-purchase-price", post(fix_purchase_price))
}

/// Apply the pack-size purchase price correction; later calls report zero.
pub async fn fix_purchase_price(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, &[Permission::WILDCARD]) {
        return resp;
    }

    match services.fix_purchase_price() {
        Ok(updated) => (StatusCode::OK, Json(dto::MigrationResponse { updated })).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn run_migrations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, &[Permission::WILDCARD]) {
        return resp;
    }

    match services.run_migrations() {
        Ok(reports) => (StatusCode::OK, Json(serde_json::json!({ "applied": reports }))).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn list_migrations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, &[Permission::WILDCARD]) {
        return resp;
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "applied": services.applied_migrations() })),
    )
        .into_response()
}
