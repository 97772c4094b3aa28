//! Pre-order traversal over a `serde_json::Value` tree.
//!
//! The walker hands every JSON object it reaches to an [`ObjectVisitor`],
//! parent before children. Object fields are followed in insertion order and
//! array elements in index order, so a walk over the same document always
//! visits objects in the same sequence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RewriteError, RewriteResult};

/// Default bound on container nesting accepted by [`JsonTreeVisitor`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Deepest nesting [`JsonTreeVisitor::parse`] will ever accept, whatever the
/// walker's own bound. Parsing recurses once per level on the calling thread.
pub const MAX_PARSE_DEPTH: usize = 512;

/// Callback invoked once for every object node of a document.
///
/// The visitor may mutate the object's fields in place. Children are read
/// after the callback returns, so whatever the callback leaves in the object
/// is what gets walked next.
pub trait ObjectVisitor {
    fn visit(&mut self, object: &mut Map<String, Value>);
}

impl<F> ObjectVisitor for F
where
    F: FnMut(&mut Map<String, Value>),
{
    fn visit(&mut self, object: &mut Map<String, Value>) {
        self(object)
    }
}

/// Counters collected during a single walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Number of object nodes handed to the visitor.
    pub objects_visited: usize,
    /// Deepest container nesting reached (scalar root = 0).
    pub max_depth_seen: usize,
}

/// Depth-bounded, pre-order walker over JSON documents.
///
/// The walker holds no per-walk state and can be shared freely between
/// threads; each call to [`walk`](Self::walk) operates on the document it is
/// given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonTreeVisitor {
    max_depth: usize,
}

impl JsonTreeVisitor {
    /// Walker with [`DEFAULT_MAX_DEPTH`].
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse `input` as a JSON document, rejecting it before deserialization
    /// if it nests deeper than this walker's bound (capped at
    /// [`MAX_PARSE_DEPTH`]).
    ///
    /// Over-deep input is reported as [`RewriteError::DepthExceeded`], never
    /// as [`RewriteError::Malformed`].
    pub fn parse(&self, input: &[u8]) -> RewriteResult<Value> {
        let max = self.max_depth.min(MAX_PARSE_DEPTH);
        let depth = raw_nesting_depth(input, max);
        if depth > max {
            return Err(RewriteError::DepthExceeded { depth, max });
        }

        let mut deserializer = serde_json::Deserializer::from_slice(input);
        deserializer.disable_recursion_limit();
        let document = Value::deserialize(&mut deserializer)
            .map_err(|e| RewriteError::Malformed(e.to_string()))?;
        deserializer
            .end()
            .map_err(|e| RewriteError::Malformed(e.to_string()))?;
        Ok(document)
    }

    /// Walk `document`, invoking `visitor` on every object node in pre-order.
    ///
    /// The depth bound is checked before the first callback runs. A document
    /// that exceeds it is returned to the caller untouched together with
    /// [`RewriteError::DepthExceeded`].
    pub fn walk<V>(&self, document: &mut Value, visitor: &mut V) -> RewriteResult<WalkStats>
    where
        V: ObjectVisitor + ?Sized,
    {
        let depth = nesting_depth_bounded(document, self.max_depth);
        if depth > self.max_depth {
            return Err(RewriteError::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }

        let mut stats = WalkStats {
            objects_visited: 0,
            max_depth_seen: depth,
        };

        // Children are pushed in reverse so the first child is popped next,
        // which yields the same order as a recursive pre-order walk.
        let mut stack: Vec<&mut Value> = vec![document];
        while let Some(value) = stack.pop() {
            match value {
                Value::Object(object) => {
                    visitor.visit(object);
                    stats.objects_visited += 1;
                    stack.extend(object.values_mut().rev());
                }
                Value::Array(items) => {
                    stack.extend(items.iter_mut().rev());
                }
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
            }
        }

        tracing::trace!(
            objects = stats.objects_visited,
            depth = stats.max_depth_seen,
            "json tree walk complete"
        );
        Ok(stats)
    }
}

impl Default for JsonTreeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Container nesting depth of `value`: scalars are 0, `{}` and `[]` are 1,
/// and every level of nesting adds one.
pub fn nesting_depth(value: &Value) -> usize {
    nesting_depth_bounded(value, usize::MAX)
}

/// Like [`nesting_depth`] but stops scanning once `limit` is exceeded, in
/// which case the returned depth is `limit + 1`.
fn nesting_depth_bounded(value: &Value, limit: usize) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(&Value, usize)> = vec![(value, 0)];
    while let Some((value, parent_depth)) = stack.pop() {
        let depth = match value {
            Value::Object(object) => {
                let depth = parent_depth + 1;
                stack.extend(object.values().map(|child| (child, depth)));
                depth
            }
            Value::Array(items) => {
                let depth = parent_depth + 1;
                stack.extend(items.iter().map(|child| (child, depth)));
                depth
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => parent_depth,
        };
        if depth > deepest {
            deepest = depth;
            if deepest > limit {
                return deepest;
            }
        }
    }
    deepest
}

/// Bracket nesting of raw JSON text, ignoring brackets inside strings. Stops
/// once `limit` is exceeded, like [`nesting_depth_bounded`]. Malformed input
/// still yields a number; rejecting it is the parser's job.
fn raw_nesting_depth(input: &[u8], limit: usize) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in input {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > deepest {
                    deepest = depth;
                    if deepest > limit {
                        return deepest;
                    }
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_arrays(levels: usize) -> Value {
        let mut value = json!(1);
        for _ in 0..levels {
            value = Value::Array(vec![value]);
        }
        value
    }

    fn labels_in_visit_order(document: &mut Value) -> Vec<String> {
        let mut seen = Vec::new();
        JsonTreeVisitor::new()
            .walk(document, &mut |object: &mut Map<String, Value>| {
                if let Some(Value::String(label)) = object.get("id") {
                    seen.push(label.clone());
                }
            })
            .unwrap();
        seen
    }

    #[test]
    fn scalar_root_visits_nothing() {
        for mut doc in [json!(null), json!(true), json!(3.5), json!("x")] {
            let stats = JsonTreeVisitor::new()
                .walk(&mut doc, &mut |_: &mut Map<String, Value>| {})
                .unwrap();
            assert_eq!(stats.objects_visited, 0);
            assert_eq!(stats.max_depth_seen, 0);
        }
    }

    #[test]
    fn visits_parent_before_children() {
        let mut doc = json!({
            "id": "root",
            "first": { "id": "a", "inner": { "id": "a1" } },
            "items": [ { "id": "b" }, [ { "id": "c" } ], 7 ],
            "last": { "id": "d" }
        });
        assert_eq!(labels_in_visit_order(&mut doc), ["root", "a", "a1", "b", "c", "d"]);
    }

    #[test]
    fn visits_objects_inside_top_level_array() {
        let mut doc = json!([{ "id": "x" }, "skip", { "id": "y", "k": [{ "id": "z" }] }]);
        assert_eq!(labels_in_visit_order(&mut doc), ["x", "y", "z"]);
    }

    #[test]
    fn every_object_visited_exactly_once() {
        let mut doc = json!({
            "a": {}, "b": [{}, {}, [{}]], "c": { "d": { "e": {} } }
        });
        let stats = JsonTreeVisitor::new()
            .walk(&mut doc, &mut |_: &mut Map<String, Value>| {})
            .unwrap();
        // root, a, two in b, one nested in b, c, d, e
        assert_eq!(stats.objects_visited, 8);
    }

    #[test]
    fn children_added_by_callback_are_walked() {
        let mut doc = json!({ "id": "root" });
        let mut count = 0;
        JsonTreeVisitor::new()
            .walk(&mut doc, &mut |object: &mut Map<String, Value>| {
                count += 1;
                if object.get("id") == Some(&json!("root")) {
                    object.insert("child".into(), json!({ "id": "added" }));
                }
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn nesting_depth_counts_containers() {
        assert_eq!(nesting_depth(&json!(42)), 0);
        assert_eq!(nesting_depth(&json!({})), 1);
        assert_eq!(nesting_depth(&json!([])), 1);
        assert_eq!(nesting_depth(&json!({ "a": [ { "b": 1 } ] })), 3);
        assert_eq!(nesting_depth(&nested_arrays(10)), 10);
    }

    #[test]
    fn depth_at_limit_is_accepted() {
        let mut doc = nested_arrays(4);
        let stats = JsonTreeVisitor::with_max_depth(4)
            .walk(&mut doc, &mut |_: &mut Map<String, Value>| {})
            .unwrap();
        assert_eq!(stats.max_depth_seen, 4);
    }

    #[test]
    fn depth_over_limit_fails_without_mutation() {
        let mut doc = json!({ "name": "root", "a": [[[{ "name": "deep" }]]] });
        let before = doc.clone();
        let err = JsonTreeVisitor::with_max_depth(3)
            .walk(&mut doc, &mut |object: &mut Map<String, Value>| {
                object.insert("name".into(), json!("changed"));
            })
            .unwrap_err();
        assert_eq!(err, RewriteError::DepthExceeded { depth: 4, max: 3 });
        assert_eq!(doc, before);
    }

    #[test]
    fn very_deep_document_does_not_overflow_the_stack() {
        let mut doc = nested_arrays(100_000);
        let err = JsonTreeVisitor::new()
            .walk(&mut doc, &mut |_: &mut Map<String, Value>| {})
            .unwrap_err();
        assert!(matches!(err, RewriteError::DepthExceeded { max: DEFAULT_MAX_DEPTH, .. }));

        let stats = JsonTreeVisitor::with_max_depth(usize::MAX)
            .walk(&mut doc, &mut |_: &mut Map<String, Value>| {})
            .unwrap();
        assert_eq!(stats.max_depth_seen, 100_000);
        // Dropping a 100k-deep serde_json::Value recurses; unwind it by hand.
        let mut current = doc;
        while let Value::Array(mut items) = current {
            current = items.pop().unwrap_or(Value::Null);
        }
    }

    fn nested_array_text(levels: usize) -> String {
        format!("{}{}", "[".repeat(levels), "]".repeat(levels))
    }

    #[test]
    fn raw_depth_ignores_brackets_in_strings() {
        assert_eq!(raw_nesting_depth(br#"{"a":"[[{{","b":[1]}"#, usize::MAX), 2);
        assert_eq!(raw_nesting_depth(br#"["\"[", [[]]]"#, usize::MAX), 3);
        assert_eq!(raw_nesting_depth(b"42", usize::MAX), 0);
        assert_eq!(raw_nesting_depth(nested_array_text(10).as_bytes(), 4), 5);
    }

    #[test]
    fn parses_beyond_serde_default_recursion_limit() {
        let text = nested_array_text(300);
        let doc = JsonTreeVisitor::new().parse(text.as_bytes()).unwrap();
        assert_eq!(nesting_depth(&doc), 300);
    }

    #[test]
    fn parse_reports_depth_not_malformed() {
        let text = nested_array_text(40);
        let err = JsonTreeVisitor::with_max_depth(32).parse(text.as_bytes()).unwrap_err();
        assert_eq!(err, RewriteError::DepthExceeded { depth: 33, max: 32 });
    }

    #[test]
    fn parse_depth_is_capped() {
        let text = nested_array_text(MAX_PARSE_DEPTH + 1);
        let err = JsonTreeVisitor::with_max_depth(usize::MAX)
            .parse(text.as_bytes())
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::DepthExceeded { depth: MAX_PARSE_DEPTH + 1, max: MAX_PARSE_DEPTH }
        );
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in ["{", "[1,]", "{} {}", ""] {
            let err = JsonTreeVisitor::new().parse(input.as_bytes()).unwrap_err();
            assert!(matches!(err, RewriteError::Malformed(_)), "{input:?}");
        }
    }

    #[test]
    fn default_walker_uses_default_depth() {
        assert_eq!(JsonTreeVisitor::default().max_depth(), DEFAULT_MAX_DEPTH);
    }
}
