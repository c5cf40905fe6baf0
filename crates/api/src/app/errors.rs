use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use inventree_auth::AuthzError;
use inventree_bom::{ExportError, TableError};
use inventree_core::DomainError;
use inventree_parts::CatalogError;
use inventree_pricing::PricingError;
use inventree_stock::StockError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Storage(msg) => {
            tracing::error!(error = %msg, "catalog storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
        other => domain_error_to_response(other.into()),
    }
}

pub fn pricing_error_to_response(err: PricingError) -> axum::response::Response {
    match err {
        PricingError::Catalog(e) => catalog_error_to_response(e),
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    match err {
        ExportError::UnknownPart(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("part {id} not found"))
        }
        ExportError::Catalog(e) => catalog_error_to_response(e),
        ExportError::Encode(e) => encode_error_to_response(e),
    }
}

pub fn encode_error_to_response(err: TableError) -> axum::response::Response {
    tracing::error!(error = %err, "failed to encode export");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "encode_error", err.to_string())
}

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match err {
        StockError::UnknownOrder(_) | StockError::UnknownLine(_) | StockError::UnknownItem(_) | StockError::UnknownSupplierPart(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        StockError::Invalid(e) => domain_error_to_response(e),
        StockError::Catalog(e) => catalog_error_to_response(e),
        StockError::Storage(msg) => {
            tracing::error!(error = %msg, "stock storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn forbidden(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}
