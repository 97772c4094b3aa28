//! Request path decomposition.
//!
//! Only the last path segment is split: `/content/page/dialog.a.b.json`
//! resolves to resource `/content/page/dialog`, selectors `[a, b]` and
//! extension `json`. Dots in parent segments are part of the resource path.

/// A request path split into resource, selectors and extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestPath {
    resource_path: String,
    selectors: Vec<String>,
    extension: Option<String>,
}

impl RequestPath {
    pub fn parse(path: &str) -> Self {
        let (parent, last) = match path.rfind('/') {
            Some(idx) => path.split_at(idx + 1),
            None => ("", path),
        };

        let Some((name, rest)) = last.split_once('.') else {
            return Self {
                resource_path: path.to_string(),
                selectors: Vec::new(),
                extension: None,
            };
        };

        let (selectors, extension) = match rest.rsplit_once('.') {
            Some((selectors, extension)) => (
                selectors.split('.').map(str::to_string).collect(),
                extension,
            ),
            None => (Vec::new(), rest),
        };

        Self {
            resource_path: format!("{parent}{name}"),
            selectors,
            extension: Some(extension.to_string()),
        }
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Selector at `index`, if present.
    pub fn selector(&self, index: usize) -> Option<&str> {
        self.selectors.get(index).map(String::as_str)
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_selectors_and_extension() {
        let p = RequestPath::parse("/apps/site/dialog.overlay.cqinclude.namespace.hero.json");
        assert_eq!(p.resource_path(), "/apps/site/dialog");
        assert_eq!(p.selectors(), ["overlay", "cqinclude", "namespace", "hero"]);
        assert_eq!(p.selector(3), Some("hero"));
        assert_eq!(p.selector(4), None);
        assert_eq!(p.extension(), Some("json"));
    }

    #[test]
    fn extension_only() {
        let p = RequestPath::parse("/content/page.json");
        assert_eq!(p.resource_path(), "/content/page");
        assert!(p.selectors().is_empty());
        assert_eq!(p.extension(), Some("json"));
    }

    #[test]
    fn no_extension() {
        let p = RequestPath::parse("/content/page");
        assert_eq!(p.resource_path(), "/content/page");
        assert!(p.selectors().is_empty());
        assert_eq!(p.extension(), None);
    }

    #[test]
    fn dots_in_parent_segments_stay_in_resource() {
        let p = RequestPath::parse("/etc/v1.2/dialog.a.json");
        assert_eq!(p.resource_path(), "/etc/v1.2/dialog");
        assert_eq!(p.selectors(), ["a"]);
    }

    #[test]
    fn empty_selectors_are_kept() {
        let p = RequestPath::parse("/d.overlay..namespace.x.json");
        assert_eq!(p.selectors(), ["overlay", "", "namespace", "x"]);
    }

    #[test]
    fn encoded_dots_stay_in_one_selector() {
        let p = RequestPath::parse("/d.overlay.cqinclude.namespace.a%2Eb.json");
        assert_eq!(p.selector(3), Some("a%2Eb"));
    }
}
