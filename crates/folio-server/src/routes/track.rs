use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use folio_core::event::{query_pairs, request_url, tag_event, RequestContext};

use crate::{error::AppError, state::AppState};

/// `GET|POST /api/track`: tag one analytics event and hand it to the sink.
///
/// ## Query
/// `event` (default `page_view`), `event_label`, `path`, the five `utm_*`
/// parameters, and any bare marker key (`?linkedin`) which stands in for
/// `utm_source`. No request body is read; GET and POST are identical.
///
/// ## Response
/// `200 OK` with `{ "success": true }`. A request whose URL cannot be rebuilt
/// from its `Host` header and target yields `500` with
/// `{ "error": "Internal Server Error" }`.
#[tracing::instrument(skip(state, headers))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = request_url(header_value(&headers, header::HOST.as_str()).as_deref(), path_and_query)
        .map_err(|e| AppError::TrackingFailed(e.into()))?;

    let ctx = RequestContext {
        forwarded_for: header_value(&headers, "x-forwarded-for"),
        referrer: header_value(&headers, header::REFERER.as_str()),
        user_agent: header_value(&headers, header::USER_AGENT.as_str()),
    };
    let event = tag_event(
        &query_pairs(&url),
        url.path(),
        &ctx,
        state.config.client_id_policy,
        Utc::now(),
    );

    state
        .sink
        .record(&event)
        .await
        .map_err(AppError::TrackingFailed)?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
