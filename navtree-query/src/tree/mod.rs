//! The include tree and the machinery that builds it.
//!
//! - [`node`]: the [`IncludeTree`] itself and its merge rules
//! - [`parser`]: declarations to [`LinearChain`]s
//! - [`builder`]: operation graphs to trees
//! - [`lookup`]: chainable, non-creating lookup for the mapping layer
//! - [`options`]: shaping stripped from filtered includes, as the engine receives it

pub mod builder;
pub mod lookup;
pub mod node;
pub mod options;
pub mod parser;

pub use builder::IncludeTreeBuilder;
pub use lookup::IncludeLookup;
pub use node::IncludeTree;
pub use options::{IncludeOptions, PlannedInclude};
pub use parser::{Declaration, LinearChain, PathParser};
