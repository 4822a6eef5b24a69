//! Live theme stylesheet.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Serve the current theme as CSS custom properties.
///
/// The `ETag` is the stylesheet version, so browsers revalidate cheaply and
/// pick up an edit from the admin on the next page load.
pub async fn stylesheet(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sheet = state.theme().stylesheet().await;
    let etag = format!("\"{}\"", sheet.version());

    let cache_headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/css; charset=utf-8")),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
    ];
    let etag_header = HeaderValue::from_str(&etag).ok();

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag));

    let mut response = if not_modified {
        (StatusCode::NOT_MODIFIED, cache_headers).into_response()
    } else {
        (cache_headers, sheet.css().to_string()).into_response()
    };
    if let Some(value) = etag_header {
        response.headers_mut().insert(header::ETAG, value);
    }
    response
}
