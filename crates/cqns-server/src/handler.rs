use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::{ServerError, ServerResult, JSON_CONTENT_TYPE};
use crate::path::RequestPath;
use crate::source::{ForwardRequest, FORWARD_MARKER_HEADER, FORWARD_SELECTORS, JSON_EXTENSION};
use crate::state::AppState;

/// Selectors the interceptor is registered for, in order.
pub const REGISTERED_SELECTORS: [&str; 3] = ["overlay", "cqinclude", "namespace"];

/// Position of the selector carrying the URL-encoded namespace.
pub const NAMESPACE_SELECTOR_INDEX: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok".into() }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "cqns-server",
        "version": env!("CARGO_PKG_VERSION"),
        "selectors": REGISTERED_SELECTORS.join("."),
        "extension": JSON_EXTENSION,
        "forward_selectors": FORWARD_SELECTORS,
    }))
}

/// Serves `<resource>.overlay.cqinclude.namespace.<ns>.json`: the resource's
/// full widget tree with every widget `name` moved under `<ns>`.
pub async fn namespace_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match namespaced_document(&state, &uri, &headers).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                error!(uri = %uri, "failed to compose namespaced widget tree: {e}");
            } else {
                debug!(uri = %uri, "request rejected: {e}");
            }
            e.into_response()
        }
    }
}

/// Anything the router does not match.
pub async fn fallback_handler(uri: Uri) -> ServerError {
    ServerError::NotAccepted(uri.path().to_string())
}

async fn namespaced_document(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
) -> ServerResult<Vec<u8>> {
    if headers.contains_key(FORWARD_MARKER_HEADER) {
        warn!(uri = %uri, "cyclic forward into the namespace interceptor");
        return Err(ServerError::CyclicForward(uri.path().to_string()));
    }

    let path = RequestPath::parse(uri.path());
    let encoded = accepted_namespace(&path)?;
    let namespace = decode_namespace(encoded)?;
    let resource = decode_resource_path(path.resource_path())?;

    let forward = ForwardRequest::infinity(&resource);
    let body = state.source.fetch(&forward).await?;
    let mut document = state.rewrite.walker.parse(&body)?;

    let summary = state
        .rewrite
        .rewriter(namespace.as_str())
        .apply_with(&state.rewrite.walker, &mut document)?;
    debug!(
        resource = %resource,
        namespace = %namespace,
        rewritten = summary.names_rewritten,
        "served namespaced widget tree"
    );

    Ok(serde_json::to_vec(&document)?)
}

/// The still-encoded namespace selector, if `path` is addressed to this
/// interceptor.
fn accepted_namespace(path: &RequestPath) -> ServerResult<&str> {
    let not_accepted = || ServerError::NotAccepted(path.resource_path().to_string());

    if path.extension() != Some(JSON_EXTENSION) {
        return Err(not_accepted());
    }
    for (index, expected) in REGISTERED_SELECTORS.iter().enumerate() {
        if path.selector(index) != Some(*expected) {
            return Err(not_accepted());
        }
    }
    match path.selector(NAMESPACE_SELECTOR_INDEX) {
        Some(namespace) if !namespace.trim().is_empty() => Ok(namespace),
        _ => Err(not_accepted()),
    }
}

/// Percent-decodes the resource part of the request path. `+` stays literal.
pub fn decode_resource_path(encoded: &str) -> ServerResult<String> {
    urlencoding::decode(encoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ServerError::InvalidPath(format!("{encoded}: {e}")))
}

/// Form-style URL decoding: `+` is a space, `%XX` a UTF-8 byte.
pub fn decode_namespace(encoded: &str) -> ServerResult<String> {
    urlencoding::decode(&encoded.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ServerError::InvalidNamespace(format!("{encoded}: {e}")))
}
