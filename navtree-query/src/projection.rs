//! Projections (`Select`) and the include nodes they imply.
//!
//! Projecting an entity-valued member loads it just as an include would, so
//! the builder turns every entity field of a projection into a root child,
//! with nested projections as its children. Scalar fields carry nothing.

use smol_str::SmolStr;

use crate::tree::IncludeTree;

/// The shape of a `Select` over the query's element type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// The projected members, in declaration order.
    pub fields: Vec<ProjectedField>,
}

/// One member of a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedField {
    /// Member name on the projected type.
    pub name: SmolStr,
    /// What the member holds.
    pub kind: FieldKind,
}

/// Kind of a projected member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar column. Contributes nothing to the tree.
    Scalar,
    /// An entity or entity collection, optionally projected further.
    Entity(Option<Projection>),
}

impl Projection {
    /// Create an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar member.
    pub fn scalar(mut self, name: impl Into<SmolStr>) -> Self {
        self.fields.push(ProjectedField {
            name: name.into(),
            kind: FieldKind::Scalar,
        });
        self
    }

    /// Add an entity-valued member loaded in full.
    pub fn entity(mut self, name: impl Into<SmolStr>) -> Self {
        self.fields.push(ProjectedField {
            name: name.into(),
            kind: FieldKind::Entity(None),
        });
        self
    }

    /// Add an entity-valued member with its own nested projection.
    pub fn nested(mut self, name: impl Into<SmolStr>, inner: Projection) -> Self {
        self.fields.push(ProjectedField {
            name: name.into(),
            kind: FieldKind::Entity(Some(inner)),
        });
        self
    }

    /// The include nodes this projection loads, one per entity field.
    pub fn include_nodes(&self) -> Vec<IncludeTree> {
        self.fields
            .iter()
            .filter_map(|field| match &field.kind {
                FieldKind::Scalar => None,
                FieldKind::Entity(inner) => {
                    let mut node = IncludeTree::named(field.name.clone());
                    for child in inner.iter().flat_map(Projection::include_nodes) {
                        node.add_child(child);
                    }
                    Some(node)
                }
            })
            .collect()
    }
}
