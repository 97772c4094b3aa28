//! HTTP interceptor serving widget trees with namespaced property names.
//!
//! A request for `<resource>.overlay.cqinclude.namespace.<ns>.json` is
//! validated, forwarded to a [`JsonSource`] as
//! `<resource>.overlay.infinity.json`, and the returned widget tree is sent
//! back with every `cq:Widget` name rewritten under `<ns>`. Rejected requests
//! get a `404` with an empty JSON object; failures after acceptance get a
//! `500` with the same body.

pub mod config;
pub mod error;
pub mod handler;
pub mod path;
pub mod router;
pub mod server;
pub mod source;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use path::RequestPath;
pub use server::CqnsServer;
pub use source::{ForwardRequest, FsSource, InMemorySource, JsonSource, RouterSource};
pub use state::{AppState, RewriteSettings};
