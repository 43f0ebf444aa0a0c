//! # navtree
//!
//! Include-declaration trees for eager-loaded queries.
//!
//! navtree provides:
//! - Typed and dotted-string `include` / `then_include` declarations
//! - An [`IncludeTree`] built from those declarations on request
//! - Side-channel declarations for data loaded by other means
//! - Non-creating lookups for mapping layers
//!
//! ## Quick Start
//!
//! ```rust
//! use navtree::prelude::*;
//!
//! struct Person;
//! struct Company;
//! impl Model for Person {
//!     const MODEL_NAME: &'static str = "Person";
//! }
//! impl Model for Company {
//!     const MODEL_NAME: &'static str = "Company";
//! }
//!
//! const COMPANY: Nav<Person, Company, One> = Nav::new("Company");
//! const OWNER: Nav<Company, Person, One> = Nav::new("Owner");
//!
//! let tree = IncludeTree::for_model::<Person, _>(|q| {
//!     q.include(COMPANY).then_include(OWNER)
//! })
//! .unwrap();
//!
//! assert!(tree.child("Company").child("Owner").is_some());
//! assert!(tree.child("Company").child("Employees").is_none());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Query building, include trees and the execution boundary.
pub mod query {
    pub use navtree_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use navtree_query::prelude::*;
    pub use navtree_query::{IncludeTreeBuilder, NavtreeConfig};
}

// Re-export key types at the crate root
pub use navtree_query::{
    IncludeLookup, IncludeTree, IncludeTreeBuilder, NavtreeConfig, Query, QueryEngine, QueryError,
    QueryResult, filter,
};
