use axum::{extract::Query, routing::get, Router};

use inventree_bom::{BomFormat, bom_template};

use crate::app::routes::common::download;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/template", get(upload_template))
}

/// BOM upload template; open to any authenticated caller.
pub async fn upload_template(Query(query): Query<dto::TemplateQuery>) -> axum::response::Response {
    let format = BomFormat::parse_or_default(query.format.as_deref());
    match bom_template(format) {
        Ok(export) => download(export),
        Err(e) => errors::encode_error_to_response(e),
    }
}
