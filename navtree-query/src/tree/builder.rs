//! Building the include tree from a query's operation graph.
//!
//! The walk starts at the last-applied operation and moves towards the
//! first. A continuation (`then_include`) is seen before the declaration it
//! continues, so it is held as pending and grafted under the tail of the
//! next declaration the walk reaches. A root-level declaration (`include`)
//! is merged into the root. A projection ends the walk: whatever was applied
//! before it cannot reach the results.

use smol_str::SmolStr;
use tracing::{debug, trace};

use super::node::IncludeTree;
use super::parser::{Declaration, PathParser};
use crate::config::NavtreeConfig;
use crate::engine::IncludeCapabilities;
use crate::error::{QueryError, QueryResult};
use crate::operation::OperationGraph;

/// Builds include trees from operation graphs.
///
/// The builder holds configuration only; every call to
/// [`build`](Self::build) returns a freshly owned tree.
#[derive(Debug, Clone, Default)]
pub struct IncludeTreeBuilder {
    parser: PathParser,
    root_name: Option<SmolStr>,
    log_declarations: bool,
}

impl IncludeTreeBuilder {
    /// Create a builder with default parsing rules and an unnamed root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from `navtree.toml` settings.
    pub fn from_config(config: &NavtreeConfig) -> Self {
        let parser = PathParser::new()
            .separator(config.tree.separator.as_str())
            .max_depth(config.tree.max_depth)
            .capabilities(config.capabilities);

        Self {
            parser,
            root_name: config.tree.root_name.as_deref().map(SmolStr::new),
            log_declarations: config.debug.log_declarations,
        }
    }

    /// Replace the path parser.
    pub fn parser(mut self, parser: PathParser) -> Self {
        self.parser = parser;
        self
    }

    /// Name the root node.
    pub fn root_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Narrow the allowed include wrappers to what an engine supports.
    pub fn restrict_to(mut self, capabilities: IncludeCapabilities) -> Self {
        let allowed = self.parser.get_capabilities().intersect(capabilities);
        self.parser = self.parser.capabilities(allowed);
        self
    }

    /// The parser in use.
    pub fn path_parser(&self) -> &PathParser {
        &self.parser
    }

    /// Build the include tree for `graph`.
    pub fn build<G: OperationGraph + ?Sized>(&self, graph: &G) -> QueryResult<IncludeTree> {
        let operations = graph.operations();
        let seed = graph.separate_includes();
        debug!(
            operations = operations.len(),
            seeded = seed.is_some(),
            "building include tree"
        );

        let mut root = IncludeTree::root(self.root_name.clone());
        if let Some(seed) = seed {
            root.merge(seed.clone());
        }

        let mut pending: Option<IncludeTree> = None;
        for operation in operations.iter().rev() {
            let Some(declaration) = self.parser.declaration(operation)? else {
                continue;
            };
            self.log(operation.kind(), &declaration);

            match declaration {
                Declaration::Root(chain) => {
                    root.add_child(chain.attach(pending.take()));
                }
                Declaration::Continuation(chain) => {
                    pending = Some(chain.attach(pending.take()));
                }
                Declaration::Projection(nodes) => {
                    if let Some(dangling) = pending {
                        return Err(dangling_error(dangling));
                    }
                    for node in nodes {
                        root.add_child(node);
                    }
                    debug!(children = root.len(), "projection ends include walk");
                    return Ok(root);
                }
            }
        }

        if let Some(dangling) = pending {
            return Err(dangling_error(dangling));
        }

        debug!(children = root.len(), depth = root.depth(), "include tree built");
        Ok(root)
    }

    fn log(&self, kind: &str, declaration: &Declaration) {
        let path = match declaration {
            Declaration::Root(chain) | Declaration::Continuation(chain) => chain.segments().join("."),
            Declaration::Projection(nodes) => format!("{} entity fields", nodes.len()),
        };
        if self.log_declarations {
            debug!(kind, path = %path, "include declaration");
        } else {
            trace!(kind, path = %path, "include declaration");
        }
    }
}

fn dangling_error(pending: IncludeTree) -> QueryError {
    let mut holder = IncludeTree::new();
    holder.add_child(pending);
    QueryError::dangling_continuation(holder.paths().join(", "))
        .with_context("Building include tree")
}
