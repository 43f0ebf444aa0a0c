//! # navtree-query
//!
//! Include trees for eager-loaded queries.
//!
//! A query declares which navigation properties of its results should be
//! loaded alongside them (`include`, `then_include`). This crate records
//! those declarations as operations on the query and replays them into an
//! [`IncludeTree`]: a tree of navigation names that a mapping layer can
//! consult to decide whether a related object was loaded or is merely
//! absent.
//!
//! ## Declaring includes
//!
//! ```rust
//! use navtree_query::prelude::*;
//!
//! struct Person;
//! struct Case;
//! struct CaseProduct;
//! impl Model for Person {
//!     const MODEL_NAME: &'static str = "Person";
//! }
//! impl Model for Case {
//!     const MODEL_NAME: &'static str = "Case";
//! }
//! impl Model for CaseProduct {
//!     const MODEL_NAME: &'static str = "CaseProduct";
//! }
//!
//! const CASES_ASSIGNED: Nav<Person, Case, Many> = Nav::new("CasesAssigned");
//! const CASE_PRODUCTS: Nav<Case, CaseProduct, Many> = Nav::new("CaseProducts");
//! const ASSIGNED_TO: Nav<Case, Person, One> = Nav::new("AssignedTo");
//!
//! let query = Query::<Person, _>::new(EmptyEngine)
//!     .include(CASES_ASSIGNED.path().filter(filter!(status == "open")).take(10))
//!     .then_include(CASE_PRODUCTS)
//!     .include(CASES_ASSIGNED)
//!     .then_include(ASSIGNED_TO)
//!     .into_query();
//!
//! let tree = query.include_tree().unwrap();
//! assert_eq!(
//!     tree.paths(),
//!     vec!["CasesAssigned.AssignedTo", "CasesAssigned.CaseProducts"]
//! );
//! ```
//!
//! ## Looking up
//!
//! Lookups never create nodes and chain through absence:
//!
//! ```rust
//! use navtree_query::{IncludeLookup, IncludeTree};
//!
//! let tree = IncludeTree::chain(["Company", "Owner"]).unwrap();
//! assert!(tree.child("Owner").is_some());
//! assert!(tree.child("Missing").child("Anything").is_none());
//! ```
//!
//! ## Side-channel includes
//!
//! Paths loaded by other means can be declared with `included_separately`;
//! they appear in the tree but are never sent to the engine.
//!
//! ## Error Handling
//!
//! Declaration problems are reported when the tree is requested, as a
//! [`QueryError`] with a code (`N1001` unsupported declaration, `N1002`
//! invalid string path, `N1003` dangling continuation) and the offending
//! path.

#[macro_use]
mod macros;

pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod filter;
pub mod logging;
pub mod model;
pub mod operation;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod separate;
pub mod tree;
pub mod types;

pub use config::NavtreeConfig;
pub use engine::{
    BoxFuture, BoxStream, EmptyEngine, IncludeCapabilities, QueryEngine, QueryPlan,
};
pub use error::{ErrorCode, QueryError, QueryResult};
pub use expr::PathExpr;
pub use filter::{Filter, FilterValue};
pub use model::{Cardinality, Many, Model, Nav, One, Path};
pub use operation::{IncludeArg, Operation, OperationGraph};
pub use pagination::Pagination;
pub use projection::{FieldKind, ProjectedField, Projection};
pub use query::{Included, IntoQuery, Loaded, Query};
pub use separate::{QueryProvider, SeparateIncludes, SeparatelyIncluded};
pub use tree::{
    Declaration, IncludeLookup, IncludeOptions, IncludeTree, IncludeTreeBuilder, LinearChain,
    PathParser, PlannedInclude,
};
pub use types::{OrderBy, OrderByField, SortOrder};

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_debug, init_from_config,
    init_with_level, is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{EmptyEngine, QueryEngine};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{Filter, FilterValue};
    pub use crate::model::{Many, Model, Nav, One, Path};
    pub use crate::projection::Projection;
    pub use crate::query::{IntoQuery, Query};
    pub use crate::tree::{IncludeLookup, IncludeTree};
    pub use crate::types::{OrderBy, OrderByField};
    pub use crate::filter;
}
