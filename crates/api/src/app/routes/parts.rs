use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;

use inventree_auth::Permission;
use inventree_bom::BomExportOptions;
use inventree_core::Currency;

use crate::app::routes::common::{download, parse_part_id, require};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

const PRICING_PERMISSIONS: [Permission; 2] = [Permission::SALES_ORDER_VIEW, Permission::PART_VIEW];

pub fn router() -> Router {
    Router::new()
        .route("/:id/pricing", get(get_pricing).post(post_pricing))
        .route("/:id/bom/download", get(download_bom))
}

pub async fn get_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<dto::PricingQuery>,
) -> axum::response::Response {
    pricing_response(&services, &principal, &id, query.quantity(), query.currency(), None)
}

/// Form submission: quantity from the JSON body (falling back to the query).
pub async fn post_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<dto::PricingQuery>,
    body: Option<Json<dto::PricingRequest>>,
) -> axum::response::Response {
    let (quantity, currency) = match body {
        Some(Json(body)) if body.quantity.is_some() => {
            (body.quantity(), body.currency().or_else(|| query.currency()))
        }
        Some(Json(body)) => (query.quantity(), body.currency().or_else(|| query.currency())),
        None => (query.quantity(), query.currency()),
    };
    pricing_response(&services, &principal, &id, quantity, currency, Some(false))
}

fn pricing_response(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
    quantity: Decimal,
    currency: Option<Currency>,
    form_valid: Option<bool>,
) -> axum::response::Response {
    if let Err(resp) = require(principal, &PRICING_PERMISSIONS) {
        return resp;
    }
    let part = match parse_part_id(id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services.pricing_context(part, quantity, currency) {
        Ok(context) => (
            StatusCode::OK,
            Json(dto::PricingResponse { context, form_valid }),
        )
            .into_response(),
        Err(e) => errors::pricing_error_to_response(e),
    }
}

pub async fn download_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, &[Permission::PART_VIEW]) {
        return resp;
    }
    let part = match parse_part_id(&id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let options = BomExportOptions::from_query(&params);
    match services.export_bom(part, &options) {
        Ok(export) => download(export),
        Err(e) => errors::export_error_to_response(e),
    }
}
