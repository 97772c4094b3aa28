//! The `cq:Widget` name rewrite rule.
//!
//! Widget nodes carry a `name` field that addresses the property they edit,
//! usually written relative to the dialog (`./title`). When the same widget
//! tree is included more than once under different overlays, each inclusion
//! must write to its own namespace, so the rule turns `./title` into
//! `./<namespace>/title`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RewriteResult;
use crate::visitor::{JsonTreeVisitor, ObjectVisitor};

/// Default type-tag field consulted on every object.
pub const DEFAULT_TYPE_FIELD: &str = "primaryType";

/// Type-tag field used by JCR-backed JSON renderings.
pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";

/// Type tag identifying a widget node.
pub const WIDGET_TYPE: &str = "cq:Widget";

/// Field holding the widget's property name.
pub const NAME_FIELD: &str = "name";

/// Path-relative marker stripped from names before prefixing.
pub const RELATIVE_PREFIX: &str = "./";

/// Counters reported by [`NamespacePrefixRewriter::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSummary {
    pub objects_visited: usize,
    pub widgets_matched: usize,
    pub names_rewritten: usize,
}

/// Prefixes the `name` of every widget node with a namespace segment.
///
/// Configuration is fixed at construction; the rewriter is immutable
/// afterwards and may be shared across threads as long as every thread
/// rewrites its own document.
///
/// Applying the rule is not idempotent: a second pass with the same namespace
/// prefixes the names again (`./ns/ns/title`). Callers apply it once per
/// document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespacePrefixRewriter {
    namespace: String,
    type_field: String,
    widget_type: String,
}

impl NamespacePrefixRewriter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            type_field: DEFAULT_TYPE_FIELD.into(),
            widget_type: WIDGET_TYPE.into(),
        }
    }

    /// Read the type tag from `field` instead of [`DEFAULT_TYPE_FIELD`].
    pub fn with_type_field(mut self, field: impl Into<String>) -> Self {
        self.type_field = field.into();
        self
    }

    /// Match objects tagged `widget_type` instead of [`WIDGET_TYPE`].
    pub fn with_widget_type(mut self, widget_type: impl Into<String>) -> Self {
        self.widget_type = widget_type.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_field(&self) -> &str {
        &self.type_field
    }

    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    /// Returns `true` if `object` is tagged as a widget.
    ///
    /// A tag that is not a JSON string never matches.
    pub fn is_widget(&self, object: &Map<String, Value>) -> bool {
        string_field(object, &self.type_field) == self.widget_type
    }

    /// The namespaced form of `raw`, or `None` when `raw` is blank once a
    /// single leading `./` has been removed.
    pub fn prefixed_name(&self, raw: &str) -> Option<String> {
        let name = raw.strip_prefix(RELATIVE_PREFIX).unwrap_or(raw);
        if name.trim().is_empty() {
            return None;
        }
        Some(format!("{RELATIVE_PREFIX}{}/{name}", self.namespace))
    }

    /// Rewrite the `name` of a single object. Returns `true` when the field
    /// was replaced.
    ///
    /// Children are not touched; use [`apply`](Self::apply) for a whole
    /// document.
    pub fn rewrite_object(&self, object: &mut Map<String, Value>) -> bool {
        if !self.is_widget(object) {
            return false;
        }
        match self.prefixed_name(string_field(object, NAME_FIELD)) {
            Some(name) => {
                object.insert(NAME_FIELD.into(), Value::String(name));
                true
            }
            None => false,
        }
    }

    /// Rewrite every widget in `document` using a walker with the default
    /// depth bound.
    pub fn apply(&self, document: &mut Value) -> RewriteResult<RewriteSummary> {
        self.apply_with(&JsonTreeVisitor::new(), document)
    }

    /// Rewrite every widget in `document` using `walker`.
    ///
    /// On error the document is left unmodified.
    pub fn apply_with(
        &self,
        walker: &JsonTreeVisitor,
        document: &mut Value,
    ) -> RewriteResult<RewriteSummary> {
        let mut summary = RewriteSummary::default();
        let stats = walker.walk(document, &mut |object: &mut Map<String, Value>| {
            if self.is_widget(object) {
                summary.widgets_matched += 1;
                if self.rewrite_object(object) {
                    summary.names_rewritten += 1;
                }
            }
        })?;
        summary.objects_visited = stats.objects_visited;

        tracing::debug!(
            namespace = %self.namespace,
            objects = summary.objects_visited,
            widgets = summary.widgets_matched,
            rewritten = summary.names_rewritten,
            "widget names namespaced"
        );
        Ok(summary)
    }
}

impl ObjectVisitor for NamespacePrefixRewriter {
    fn visit(&mut self, object: &mut Map<String, Value>) {
        self.rewrite_object(object);
    }
}

/// Rewrite `document` with the default rule and return it.
///
/// By-value counterpart to [`NamespacePrefixRewriter::apply`].
pub fn rewrite(mut document: Value, namespace: &str) -> RewriteResult<Value> {
    NamespacePrefixRewriter::new(namespace).apply(&mut document)?;
    Ok(document)
}

/// String value of `key`, or `""` when absent or not a string.
fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a str {
    object.get(key).and_then(Value::as_str).unwrap_or_default()
}
