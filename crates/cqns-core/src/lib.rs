//! Namespace rewriting for widget configuration trees.
//!
//! Walks a JSON document describing a tree of UI widgets and prefixes the
//! `name` field of every `cq:Widget` node with a caller-supplied namespace, so
//! the same widget tree can be included several times without its properties
//! colliding.
//!
//! # Key Types
//!
//! - [`JsonTreeVisitor`] / [`ObjectVisitor`] -- depth-bounded pre-order walk over object nodes
//! - [`NamespacePrefixRewriter`] -- the `cq:Widget` name prefix rule
//! - [`RewriteError`] -- the single abort condition (document too deep)
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({ "primaryType": "cq:Widget", "name": "./title" });
//! let out = cqns_core::rewrite(doc, "hero").unwrap();
//! assert_eq!(out["name"], "./hero/title");
//! ```

pub mod error;
pub mod rewriter;
pub mod visitor;

pub use error::{RewriteError, RewriteResult};
pub use rewriter::{
    rewrite, NamespacePrefixRewriter, RewriteSummary, DEFAULT_TYPE_FIELD, JCR_PRIMARY_TYPE,
    NAME_FIELD, RELATIVE_PREFIX, WIDGET_TYPE,
};
pub use visitor::{
    nesting_depth, JsonTreeVisitor, ObjectVisitor, WalkStats, DEFAULT_MAX_DEPTH, MAX_PARSE_DEPTH,
};
