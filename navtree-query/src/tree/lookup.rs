//! Non-creating lookup for the mapping layer.
//!
//! The mapping layer walks loaded objects and the include tree side by side.
//! For every navigation property it asks the current node whether that
//! property was loaded; absent names answer `None`, so the walk can chain
//! lookups without checking each hop:
//!
//! ```rust
//! use navtree_query::{IncludeLookup, IncludeTree};
//!
//! let mut root = IncludeTree::new();
//! root.add_child(IncludeTree::chain(["CasesAssigned", "CaseProducts"]).unwrap());
//!
//! assert!(root.child("CasesAssigned").child("CaseProducts").is_some());
//! assert!(root.child("CasesReported").child("ReportedBy").is_none());
//! assert!(!root.child("CasesAssigned").includes("AssignedTo"));
//! ```

use super::node::IncludeTree;

/// Chainable lookup over an include tree or a lookup that already missed.
pub trait IncludeLookup<'a>: Copy {
    /// The child named `name`, or `None` if it was never declared.
    fn child(self, name: &str) -> Option<&'a IncludeTree>;

    /// Whether `name` was loaded beneath this node.
    fn includes(self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Follow several names at once.
    fn descend<I, S>(self, names: I) -> Option<&'a IncludeTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;
}

impl<'a> IncludeLookup<'a> for &'a IncludeTree {
    fn child(self, name: &str) -> Option<&'a IncludeTree> {
        self.get(name)
    }

    fn descend<I, S>(self, names: I) -> Option<&'a IncludeTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.path(names)
    }
}

impl<'a> IncludeLookup<'a> for Option<&'a IncludeTree> {
    fn child(self, name: &str) -> Option<&'a IncludeTree> {
        self.and_then(|node| node.get(name))
    }

    fn descend<I, S>(self, names: I) -> Option<&'a IncludeTree>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.and_then(|node| node.path(names))
    }
}
