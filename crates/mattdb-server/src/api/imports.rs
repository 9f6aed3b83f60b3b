//! Bulk product import endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use mattdb_core::ImportRow;

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct BulkImportRequest {
    #[serde(default)]
    pub rows: Vec<ImportRow>,
}

/// POST /api/admin/products/bulk — decode and load product rows.
///
/// The response shapes are a fixed contract with the admin import tooling
/// and deliberately not wrapped in the standard envelope:
/// - `200` `{"inserted": <count>}` — count of rows whose product record was
///   created; child-group failures are logged server-side only.
/// - `400` `{"error": "No rows provided"}` — `rows` missing or empty.
/// - `500` `{"error": <message>}` — request body could not be decoded.
pub(super) async fn bulk_import(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BulkImportRequest>, JsonRejection>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::error!(request_id = %req_id.0, error = %rejection, "bulk import body rejected");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": rejection.body_text() })),
            );
        }
    };

    if body.rows.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No rows provided" })),
        );
    }

    tracing::info!(request_id = %req_id.0, rows = body.rows.len(), "bulk import started");
    let outcome = mattdb_db::run_import(&state.pool, &body.rows).await;
    tracing::info!(
        request_id = %req_id.0,
        inserted = outcome.inserted,
        "bulk import finished"
    );

    (
        StatusCode::OK,
        Json(json!({ "inserted": outcome.inserted })),
    )
}
