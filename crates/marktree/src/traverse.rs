//! Read-only depth-first traversal

use crate::tree::Node;

impl Node {
    /// Visit every node in document order, parents before children
    ///
    /// The visitor receives a `/`-joined path of local names from the root to
    /// the current node; anonymous nodes contribute no segment. Namespace
    /// prefixes are not part of the path, so siblings differing only by
    /// prefix share one. Returning `false` stops the traversal immediately.
    /// The return value reports whether the traversal ran to completion.
    ///
    /// ```
    /// # fn main() -> Result<(), marktree::Error> {
    /// let doc = marktree::from_str("<kml><Document><name>hi</name></Document></kml>")?;
    /// let mut paths = Vec::new();
    /// doc.traverse(|path, _| {
    ///     paths.push(path.to_string());
    ///     true
    /// });
    /// assert_eq!(paths, ["kml", "kml/Document", "kml/Document/name"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn traverse<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&str, &Node) -> bool,
    {
        self.traverse_inner("", &mut visit)
    }

    fn traverse_inner<F>(&self, prefix: &str, visit: &mut F) -> bool
    where
        F: FnMut(&str, &Node) -> bool,
    {
        let path = join_path(prefix, &self.name.local);
        if !visit(&path, self) {
            return false;
        }
        for child in &self.children {
            if !child.traverse_inner(&path, visit) {
                return false;
            }
        }
        true
    }
}

/// Join two path segments, eliding empty ones
fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else if segment.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(input: &str) -> Node {
        Parser::new(input.as_bytes()).parse().unwrap()
    }

    #[test]
    fn test_traverse_order_and_paths() {
        let doc = parse("<kml><Document><name>x</name><desc>y</desc></Document></kml>");
        let mut seen = Vec::new();
        let done = doc.traverse(|path, _| {
            seen.push(path.to_string());
            true
        });
        assert!(done);
        assert_eq!(
            seen,
            ["kml", "kml/Document", "kml/Document/name", "kml/Document/desc"]
        );
    }

    #[test]
    fn test_traverse_early_exit() {
        let doc = parse("<a><b><deep/></b><c/><d/></a>");
        let mut seen = Vec::new();
        let done = doc.traverse(|path, _| {
            seen.push(path.to_string());
            path != "a/b"
        });
        assert!(!done);
        // stopping on the second node leaves exactly two visited
        assert_eq!(seen, ["a", "a/b"]);
    }

    #[test]
    fn test_traverse_anonymous_segments_elided() {
        let doc = parse("<a>text<b/></a>");
        let mut seen = Vec::new();
        doc.traverse(|path, _| {
            seen.push(path.to_string());
            true
        });
        // the anonymous text child reports its parent's path
        assert_eq!(seen, ["a", "a", "a/b"]);
    }

    #[test]
    fn test_traverse_visits_node_data() {
        let doc = parse("<a><b id=\"7\">x</b></a>");
        let mut id = None;
        doc.traverse(|path, node| {
            if path == "a/b" {
                id = node.attr("id").map(str::to_string);
            }
            true
        });
        assert_eq!(id.as_deref(), Some("7"));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", ""), "a");
        assert_eq!(join_path("a", "b"), "a/b");
    }
}
