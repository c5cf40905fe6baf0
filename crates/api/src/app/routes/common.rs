use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use inventree_auth::Permission;
use inventree_bom::BomExport;
use inventree_core::PartId;

use crate::app::errors;
use crate::context::PrincipalContext;

pub fn parse_part_id(raw: &str) -> Result<PartId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid part id"))
}

pub fn require(principal: &PrincipalContext, required: &[Permission]) -> Result<(), Response> {
    crate::authz::require(principal, required).map_err(errors::forbidden)
}

/// Serve a rendered export as a file download.
pub fn download(export: BomExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename.replace('"', "'"));
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(export.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response()
}
