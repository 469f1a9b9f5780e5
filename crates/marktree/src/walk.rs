//! Mutating depth-first walk with flow control

use crate::tree::Node;

/// Position metadata handed to walk visitors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeInfo {
    /// Local names from the root down to the current node; anonymous nodes
    /// contribute empty segments
    pub path: Vec<String>,
    /// Zero-based position among the siblings (0 for the root)
    pub index: usize,
    /// Position counted from the end of the sibling list, -1 being the last
    /// child (0 for the root)
    pub rindex: i64,
}

/// Visitor verdict controlling how the walk proceeds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkFlow {
    /// Descend into the children, then continue with the next sibling
    Continue,
    /// Skip the children and whatever remains at this level
    SkipLevel,
    /// Abort the walk entirely
    Terminate,
}

impl Node {
    /// Visit every node in document order with mutable access
    ///
    /// The visitor may rewrite names, attributes, content and children. Its
    /// verdict steers the walk: [`WalkFlow::SkipLevel`] abandons the current
    /// node's children and its remaining siblings, [`WalkFlow::Terminate`]
    /// stops everything.
    ///
    /// ```
    /// # fn main() -> Result<(), marktree::Error> {
    /// let mut doc = marktree::from_str("<a><b>x</b><c>y</c></a>")?;
    /// doc.walk(|_, node| {
    ///     node.text = node.text.to_uppercase();
    ///     marktree::WalkFlow::Continue
    /// });
    /// assert_eq!(doc.to_xml(false)?, "<a><b>X</b><c>Y</c></a>");
    /// # Ok(())
    /// # }
    /// ```
    pub fn walk<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&NodeInfo, &mut Node) -> WalkFlow,
    {
        let info = NodeInfo {
            path: vec![self.name.local.clone()],
            index: 0,
            rindex: 0,
        };
        let _ = self.walk_inner(&info, &mut visitor);
    }

    fn walk_inner<F>(&mut self, info: &NodeInfo, visitor: &mut F) -> WalkFlow
    where
        F: FnMut(&NodeInfo, &mut Node) -> WalkFlow,
    {
        match visitor(info, self) {
            WalkFlow::Continue => {}
            verdict => return verdict,
        }
        let len = self.children.len();
        for (i, child) in self.children.iter_mut().enumerate() {
            let child_info = child_node_info(info, child, i, len);
            match child.walk_inner(&child_info, visitor) {
                WalkFlow::Terminate => return WalkFlow::Terminate,
                // the skipped level ends here; the parent reports normal
                // completion so walking resumes above it
                WalkFlow::SkipLevel => return WalkFlow::Continue,
                WalkFlow::Continue => {}
            }
        }
        WalkFlow::Continue
    }

    /// Walk variant threading an accumulator through every visit
    ///
    /// Flow control works exactly as in [`Node::walk`]; the accumulator
    /// returned by each visit is handed to the next one, and the final value
    /// comes back to the caller.
    pub fn walk_fold<A, F>(&mut self, acc: A, mut visitor: F) -> A
    where
        F: FnMut(&NodeInfo, &mut Node, A) -> (WalkFlow, A),
    {
        let info = NodeInfo {
            path: vec![self.name.local.clone()],
            index: 0,
            rindex: 0,
        };
        let (_, acc) = self.walk_fold_inner(&info, acc, &mut visitor);
        acc
    }

    fn walk_fold_inner<A, F>(&mut self, info: &NodeInfo, acc: A, visitor: &mut F) -> (WalkFlow, A)
    where
        F: FnMut(&NodeInfo, &mut Node, A) -> (WalkFlow, A),
    {
        let (verdict, mut acc) = visitor(info, self, acc);
        match verdict {
            WalkFlow::Continue => {}
            other => return (other, acc),
        }
        let len = self.children.len();
        for (i, child) in self.children.iter_mut().enumerate() {
            let child_info = child_node_info(info, child, i, len);
            let (verdict, next) = child.walk_fold_inner(&child_info, acc, visitor);
            acc = next;
            match verdict {
                WalkFlow::Terminate => return (WalkFlow::Terminate, acc),
                WalkFlow::SkipLevel => return (WalkFlow::Continue, acc),
                WalkFlow::Continue => {}
            }
        }
        (WalkFlow::Continue, acc)
    }
}

/// Info for a child about to be visited; the path segment reflects the name
/// at entry, before the visitor gets a chance to rewrite it
#[allow(clippy::as_conversions)]
fn child_node_info(parent: &NodeInfo, child: &Node, index: usize, len: usize) -> NodeInfo {
    let mut path = parent.path.clone();
    path.push(child.name.local.clone());
    NodeInfo {
        path,
        index,
        rindex: index as i64 - len as i64,
    }
}
