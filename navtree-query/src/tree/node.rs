//! The include tree node.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::{Serialize, Serializer};
use smol_str::SmolStr;

/// A hierarchy of navigation properties that were eagerly loaded.
///
/// Each node names one navigation property; its children name the
/// properties loaded beneath it. The root is unnamed unless a root name is
/// configured. A name appears at most once among the children of a node:
/// declaring the same path twice merges, never duplicates.
///
/// ```rust
/// use navtree_query::IncludeTree;
///
/// let mut root = IncludeTree::new();
/// root.add_linear_child(IncludeTree::chain(["CasesAssigned", "CaseProducts"]).unwrap());
/// root.add_linear_child(IncludeTree::chain(["CasesAssigned", "AssignedTo"]).unwrap());
///
/// let cases = root.get("CasesAssigned").unwrap();
/// assert_eq!(cases.len(), 2);
/// assert!(root.get("CasesReported").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IncludeTree {
    name: Option<SmolStr>,
    children: BTreeMap<SmolStr, IncludeTree>,
}

impl IncludeTree {
    /// Create an unnamed root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root with an optional name.
    pub fn root(name: Option<SmolStr>) -> Self {
        Self {
            name,
            children: BTreeMap::new(),
        }
    }

    /// Create a leaf node for one navigation property.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self::root(Some(name.into()))
    }

    /// Build a linear chain `a -> b -> c`, returning its head.
    ///
    /// Returns `None` when `names` is empty.
    pub fn chain<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<SmolStr>,
    {
        names.into_iter().rev().fold(None, |below, name| {
            let mut node = Self::named(name);
            if let Some(child) = below {
                node.add_child(child);
            }
            Some(node)
        })
    }

    /// The navigation-property name, or `None` for an unnamed root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Merge `node` in as a child and return the canonical child.
    ///
    /// If a child with the same name exists, `node`'s children are merged
    /// into it recursively and the pre-existing child is returned. An
    /// unnamed node is merged into `self`.
    pub fn add_child(&mut self, node: IncludeTree) -> &mut IncludeTree {
        let IncludeTree { name, children } = node;
        let Some(name) = name else {
            self.merge_children(children);
            return self;
        };

        match self.children.entry(name.clone()) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.merge_children(children);
                existing
            }
            Entry::Vacant(entry) => entry.insert(IncludeTree {
                name: Some(name),
                children,
            }),
        }
    }

    /// Merge a linear chain in and return the node at the end of it.
    ///
    /// The chain is followed through each node's first child; any further
    /// children are merged with [`add_child`](Self::add_child) on the way.
    pub fn add_linear_child(&mut self, head: IncludeTree) -> &mut IncludeTree {
        let IncludeTree { name, children } = head;
        let node = match name {
            Some(name) => self
                .children
                .entry(name.clone())
                .or_insert_with(|| IncludeTree::named(name)),
            None => self,
        };

        let mut children = children.into_values();
        match children.next() {
            Some(next) => {
                for extra in children {
                    node.add_child(extra);
                }
                node.add_linear_child(next)
            }
            None => node,
        }
    }

    /// Merge every child of `other` into this tree. `other`'s name is ignored.
    pub fn merge(&mut self, other: IncludeTree) {
        self.merge_children(other.children);
    }

    fn merge_children(&mut self, children: BTreeMap<SmolStr, IncludeTree>) {
        for child in children.into_values() {
            self.add_child(child);
        }
    }

    /// Look up a direct child. Never creates.
    pub fn get(&self, name: &str) -> Option<&IncludeTree> {
        self.children.get(name)
    }

    /// Follow a sequence of names from this node.
    pub fn path<I, S>(&self, names: I) -> Option<&IncludeTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(self, |node, name| node.get(name.as_ref()))
    }

    pub(crate) fn path_mut<I, S>(&mut self, names: I) -> Option<&mut IncludeTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = self;
        for name in names {
            node = node.children.get_mut(name.as_ref())?;
        }
        Some(node)
    }

    /// Check if a direct child exists.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Names of the direct children, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(SmolStr::as_str)
    }

    /// The direct children, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &IncludeTree> {
        self.children.values()
    }

    /// Number of levels below this node (a leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.iter().map(|c| c.depth() + 1).max().unwrap_or(0)
    }

    /// Every path from this node to a leaf, joined with `.`.
    pub fn paths(&self) -> Vec<String> {
        self.paths_with_separator(".")
    }

    /// Every path from this node to a leaf, joined with `separator`.
    pub fn paths_with_separator(&self, separator: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect_paths(separator, &mut prefix, &mut out);
        out
    }

    fn collect_paths<'a>(&'a self, separator: &str, prefix: &mut Vec<&'a str>, out: &mut Vec<String>) {
        for (name, child) in &self.children {
            prefix.push(name.as_str());
            if child.is_empty() {
                out.push(prefix.join(separator));
            } else {
                child.collect_paths(separator, prefix, out);
            }
            prefix.pop();
        }
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for child in self.iter() {
            write!(f, "\n{:indent$}{}", "", child.name().unwrap_or_default(), indent = depth * 2)?;
            child.write_outline(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for IncludeTree {
    /// Renders an indented outline, two spaces per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("<root>"))?;
        self.write_outline(f, 1)
    }
}

impl Serialize for IncludeTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.children.iter().map(|(name, child)| (name.as_str(), child)))
    }
}

impl<'a> IntoIterator for &'a IncludeTree {
    type Item = &'a IncludeTree;
    type IntoIter = std::collections::btree_map::Values<'a, SmolStr, IncludeTree>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain(names: &[&str]) -> IncludeTree {
        IncludeTree::chain(names.iter().copied()).expect("non-empty chain")
    }

    #[test]
    fn test_chain_is_linear() {
        let head = chain(&["A", "B", "C"]);
        assert_eq!(head.name(), Some("A"));
        assert_eq!(head.len(), 1);
        assert_eq!(head.path(["B", "C"]).map(IncludeTree::is_empty), Some(true));
        assert!(IncludeTree::chain(Vec::<&str>::new()).is_none());
    }

    #[test]
    fn test_add_child_merges_and_returns_existing() {
        let mut root = IncludeTree::new();
        root.add_child(chain(&["A", "B"]));
        let a = root.add_child(chain(&["A", "C"]));
        assert_eq!(a.name(), Some("A"));
        assert_eq!(a.names().collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_add_child_is_commutative() {
        let mut first = IncludeTree::new();
        first.add_child(chain(&["A", "B", "C"]));
        first.add_child(chain(&["A", "B", "D"]));

        let mut second = IncludeTree::new();
        second.add_child(chain(&["A", "B", "D"]));
        second.add_child(chain(&["A", "B", "C"]));

        assert_eq!(first, second);
    }

    #[test]
    fn test_add_linear_child_returns_tail() {
        let mut root = IncludeTree::new();
        let tail = root.add_linear_child(chain(&["A", "B"]));
        assert_eq!(tail.name(), Some("B"));
        tail.add_child(IncludeTree::named("C"));

        let tail = root.add_linear_child(chain(&["A", "B"]));
        assert_eq!(tail.names().collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(root.paths(), vec!["A.B.C"]);
    }

    #[test]
    fn test_add_linear_child_keeps_extra_branches() {
        let mut head = chain(&["A", "B"]);
        head.add_child(IncludeTree::named("Z"));
        let mut root = IncludeTree::new();
        let tail = root.add_linear_child(head);
        assert_eq!(tail.name(), Some("B"));
        assert_eq!(root.paths(), vec!["A.B", "A.Z"]);
    }

    #[test]
    fn test_unnamed_node_merges_into_self() {
        let mut other = IncludeTree::new();
        other.add_child(chain(&["X", "Y"]));
        let mut root = IncludeTree::new();
        let returned = root.add_child(other);
        assert!(returned.name().is_none());
        assert!(root.path(["X", "Y"]).is_some());
    }

    #[test]
    fn test_lookup_never_creates() {
        let root = IncludeTree::new();
        assert!(root.get("NeverDeclared").is_none());
        assert!(root.get("NeverDeclared").is_none());
        assert!(root.is_empty());
    }

    #[test]
    fn test_depth_and_paths() {
        let mut root = IncludeTree::new();
        root.add_child(chain(&["A", "B", "C"]));
        root.add_child(chain(&["D"]));
        assert_eq!(root.depth(), 3);
        assert_eq!(root.paths(), vec!["A.B.C", "D"]);
        assert_eq!(root.paths_with_separator("/"), vec!["A/B/C", "D"]);
    }

    #[test]
    fn test_display_outline() {
        let mut root = IncludeTree::new();
        root.add_child(chain(&["Cases", "Owner"]));
        root.add_child(chain(&["Company"]));
        assert_eq!(root.to_string(), "<root>\n  Cases\n    Owner\n  Company");
    }

    #[test]
    fn test_serialize_nested_maps() {
        let mut root = IncludeTree::new();
        root.add_child(chain(&["Cases", "Owner"]));
        let json = serde_json::to_value(&root).expect("serializable");
        assert_eq!(json, serde_json::json!({ "Cases": { "Owner": {} } }));
    }
}
