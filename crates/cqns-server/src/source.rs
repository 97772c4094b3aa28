//! Sources for the widget document a request is forwarded to.
//!
//! The interceptor never renders widget trees itself. It asks a
//! [`JsonSource`] for the `overlay.infinity` rendering of the requested
//! resource and receives the buffered body, unparsed.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use tower::util::ServiceExt;

use crate::error::{ServerError, ServerResult};

/// Header set on requests forwarded by [`RouterSource`]. A request arriving
/// with it has already been through the interceptor.
pub const FORWARD_MARKER_HEADER: &str = "x-cqns-forwarded";

/// Selectors the resource is re-requested with.
pub const FORWARD_SELECTORS: &str = "overlay.infinity";

pub const JSON_EXTENSION: &str = "json";

/// The internal re-request for a resource's full widget tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardRequest {
    pub resource_path: String,
    pub selectors: String,
    pub extension: String,
}

impl ForwardRequest {
    /// Forward for `resource_path` with [`FORWARD_SELECTORS`] and the json extension.
    pub fn infinity(resource_path: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            selectors: FORWARD_SELECTORS.into(),
            extension: JSON_EXTENSION.into(),
        }
    }

    /// Path of the forwarded request, e.g. `/apps/dialog.overlay.infinity.json`.
    pub fn path(&self) -> String {
        if self.selectors.is_empty() {
            format!("{}.{}", self.resource_path, self.extension)
        } else {
            format!("{}.{}.{}", self.resource_path, self.selectors, self.extension)
        }
    }
}

/// Supplies the buffered JSON body for a forwarded request.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch the document for `request`.
    ///
    /// Returns [`ServerError::ResourceNotFound`] when the resource does not
    /// exist. The body is returned as-is; parsing is the caller's concern.
    async fn fetch(&self, request: &ForwardRequest) -> ServerResult<Bytes>;
}

/// In-memory source keyed by resource path. Intended for tests and embedding.
pub struct InMemorySource {
    documents: RwLock<HashMap<String, Bytes>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Store `document` for `resource_path`, replacing any previous entry.
    pub fn insert(&self, resource_path: impl Into<String>, document: &serde_json::Value) {
        let body = Bytes::from(document.to_string());
        self.insert_raw(resource_path, body);
    }

    /// Store a raw body, which need not be valid JSON.
    pub fn insert_raw(&self, resource_path: impl Into<String>, body: impl Into<Bytes>) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(resource_path.into(), body.into());
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JsonSource for InMemorySource {
    async fn fetch(&self, request: &ForwardRequest) -> ServerResult<Bytes> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(&request.resource_path)
            .cloned()
            .ok_or_else(|| ServerError::ResourceNotFound(request.resource_path.clone()))
    }
}

/// Reads `<root>/<resource path>.json` from disk.
///
/// The file is expected to hold the complete widget tree already, so the
/// forwarded selectors are not consulted.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `resource_path`, or `None` if the path would leave the root.
    pub fn file_for(&self, resource_path: &str) -> Option<PathBuf> {
        let relative = Path::new(resource_path.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || relative.as_os_str().is_empty() {
            return None;
        }
        let mut file = self.root.join(relative).into_os_string();
        file.push(".");
        file.push(JSON_EXTENSION);
        Some(PathBuf::from(file))
    }
}

#[async_trait]
impl JsonSource for FsSource {
    async fn fetch(&self, request: &ForwardRequest) -> ServerResult<Bytes> {
        let not_found = || ServerError::ResourceNotFound(request.resource_path.clone());
        let file = self.file_for(&request.resource_path).ok_or_else(not_found)?;
        match tokio::fs::read(&file).await {
            Ok(body) => Ok(Bytes::from(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(ServerError::Io(e)),
        }
    }
}

/// Forwards to another axum router, the way a host dispatches a request to
/// the renderer registered for the replaced selectors.
///
/// The forwarded request carries [`FORWARD_MARKER_HEADER`]. The response
/// body is buffered up to `max_body_size` bytes.
#[derive(Clone, Debug)]
pub struct RouterSource {
    router: Router,
    max_body_size: usize,
}

impl RouterSource {
    pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

    pub fn new(router: Router) -> Self {
        Self {
            router,
            max_body_size: Self::DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }
}

#[async_trait]
impl JsonSource for RouterSource {
    async fn fetch(&self, request: &ForwardRequest) -> ServerResult<Bytes> {
        let forwarded = Request::builder()
            .method(Method::GET)
            .uri(request.path())
            .header(FORWARD_MARKER_HEADER, "1")
            .body(Body::empty())
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let response = match self.router.clone().oneshot(forwarded).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServerError::ResourceNotFound(request.resource_path.clone()));
        }
        if !status.is_success() {
            return Err(ServerError::Source(format!("{} returned {status}", request.path())));
        }

        axum::body::to_bytes(response.into_body(), self.max_body_size)
            .await
            .map_err(|e| ServerError::Source(e.to_string()))
    }
}
