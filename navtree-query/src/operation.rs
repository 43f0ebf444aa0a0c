//! The operation graph of a query pipeline.

use std::fmt;

use smol_str::SmolStr;

use crate::expr::PathExpr;
use crate::filter::Filter;
use crate::projection::Projection;
use crate::tree::IncludeTree;
use crate::types::OrderBy;

/// The argument of an `include` call.
#[derive(Debug, Clone, PartialEq)]
pub enum IncludeArg {
    /// A dotted string path such as `"CasesAssigned.CaseProducts"`.
    Path(SmolStr),
    /// A path expression over the query's element type.
    Expr(PathExpr),
}

impl fmt::Display for IncludeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "\"{}\"", path),
            Self::Expr(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<PathExpr> for IncludeArg {
    fn from(expr: PathExpr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&str> for IncludeArg {
    fn from(path: &str) -> Self {
        Self::Path(path.into())
    }
}

/// One step of a query pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Query-level filter.
    Filter(Filter),
    /// Query-level ordering.
    OrderBy(OrderBy),
    /// Query-level skip.
    Skip(u64),
    /// Query-level take.
    Take(u64),
    /// Root-level eager load.
    Include(IncludeArg),
    /// Eager load continuing the previous include.
    ThenInclude(PathExpr),
    /// Projection of the element type. Terminal for the include tree.
    Select(Projection),
}

impl Operation {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::OrderBy(_) => "order_by",
            Self::Skip(_) => "skip",
            Self::Take(_) => "take",
            Self::Include(_) => "include",
            Self::ThenInclude(_) => "then_include",
            Self::Select(_) => "select",
        }
    }

    /// Whether this operation can contribute to the include tree.
    pub fn is_tree_operation(&self) -> bool {
        matches!(self, Self::Include(_) | Self::ThenInclude(_) | Self::Select(_))
    }
}

/// Read access to a query's pipeline, as the tree builder needs it.
///
/// `operations` is in application order: the first operation applied comes
/// first. The builder walks it from the end.
pub trait OperationGraph {
    /// Operations in application order.
    fn operations(&self) -> &[Operation];

    /// Root of the paths declared through the side channel, if any were.
    fn separate_includes(&self) -> Option<&IncludeTree>;
}

impl OperationGraph for [Operation] {
    fn operations(&self) -> &[Operation] {
        self
    }

    fn separate_includes(&self) -> Option<&IncludeTree> {
        None
    }
}

impl OperationGraph for Vec<Operation> {
    fn operations(&self) -> &[Operation] {
        self
    }

    fn separate_includes(&self) -> Option<&IncludeTree> {
        None
    }
}
