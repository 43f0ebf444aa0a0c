//! Turning include declarations into linear chains.
//!
//! Every include declaration, whatever its surface form, describes one
//! linear chain of navigation properties. The parser strips the shaping
//! wrappers off a path expression (collecting them as [`IncludeOptions`]),
//! walks the remaining member accesses back to the parameter, and returns
//! the chain. Dotted strings split on the configured separator.
//!
//! ```rust
//! use navtree_query::expr::PathExpr;
//! use navtree_query::filter::Filter;
//! use navtree_query::tree::PathParser;
//!
//! let parser = PathParser::new();
//! let expr = PathExpr::members(["CasesAssigned"])
//!     .filter(Filter::eq("status", "open"))
//!     .take(5);
//!
//! let chain = parser.parse_expr(&expr).unwrap();
//! assert_eq!(chain.head(), "CasesAssigned");
//! assert!(chain.options().filter.is_some());
//!
//! let chain = parser.parse_str("CasesAssigned.CaseProducts").unwrap();
//! assert_eq!(chain.len(), 2);
//! ```

use smol_str::SmolStr;
use tracing::trace;

use super::node::IncludeTree;
use super::options::{IncludeOptions, PlannedInclude};
use crate::engine::IncludeCapabilities;
use crate::error::{QueryError, QueryResult};
use crate::expr::PathExpr;
use crate::operation::{IncludeArg, Operation};

/// Default separator for dotted string paths.
pub const DEFAULT_SEPARATOR: &str = ".";

/// A parsed declaration: one navigation property per segment, each the only
/// child of the one before, plus the shaping stripped from around it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearChain {
    segments: Vec<SmolStr>,
    options: IncludeOptions,
}

impl LinearChain {
    /// Segment names from head to tail.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// Shaping declared around the chain.
    pub fn options(&self) -> &IncludeOptions {
        &self.options
    }

    /// Name of the first segment.
    pub fn head(&self) -> &str {
        self.segments.first().map(SmolStr::as_str).unwrap_or_default()
    }

    /// Name of the last segment.
    pub fn tail(&self) -> &str {
        self.segments.last().map(SmolStr::as_str).unwrap_or_default()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for chains produced by [`PathParser`].
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Build the chain as a tree and return its head.
    pub fn into_tree(self) -> IncludeTree {
        self.attach(None)
    }

    /// Build the chain as a tree with `below` merged under its tail.
    pub fn attach(self, below: Option<IncludeTree>) -> IncludeTree {
        self.segments
            .into_iter()
            .rev()
            .fold(below, |below, name| {
                let mut node = IncludeTree::named(name);
                if let Some(child) = below {
                    node.add_child(child);
                }
                Some(node)
            })
            .unwrap_or_default()
    }

    /// Split into segments and options.
    pub fn into_parts(self) -> (Vec<SmolStr>, IncludeOptions) {
        (self.segments, self.options)
    }
}

/// A declaration as the builder sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// Names a property directly off the query's element type.
    Root(LinearChain),
    /// Continues from the tail of the previous declaration.
    Continuation(LinearChain),
    /// A terminal projection and the include nodes it implies.
    Projection(Vec<IncludeTree>),
}

/// Parses include declarations.
#[derive(Debug, Clone)]
pub struct PathParser {
    separator: SmolStr,
    max_depth: Option<usize>,
    capabilities: IncludeCapabilities,
}

impl Default for PathParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PathParser {
    /// A parser with the default separator, no depth limit and every
    /// wrapper allowed.
    pub fn new() -> Self {
        Self {
            separator: SmolStr::new_static(DEFAULT_SEPARATOR),
            max_depth: None,
            capabilities: IncludeCapabilities::all(),
        }
    }

    /// Set the dotted-path separator. Empty separators are ignored.
    pub fn separator(mut self, separator: impl Into<SmolStr>) -> Self {
        let separator = separator.into();
        if !separator.is_empty() {
            self.separator = separator;
        }
        self
    }

    /// Reject declarations naming more than `max_depth` segments.
    ///
    /// The limit applies to each declaration alone, not to the branch a
    /// chain of continuations builds.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Restrict the wrappers that may surround an include.
    pub fn capabilities(mut self, capabilities: IncludeCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The configured separator.
    pub fn get_separator(&self) -> &str {
        &self.separator
    }

    /// The configured depth limit.
    pub fn get_max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// The wrappers this parser accepts.
    pub fn get_capabilities(&self) -> IncludeCapabilities {
        self.capabilities
    }

    /// Classify one pipeline step. Non-tree operations yield `None`.
    pub fn declaration(&self, operation: &Operation) -> QueryResult<Option<Declaration>> {
        let declaration = match operation {
            Operation::Include(arg) => Declaration::Root(self.parse_arg(arg)?),
            Operation::ThenInclude(expr) => Declaration::Continuation(self.parse_expr(expr)?),
            Operation::Select(projection) => Declaration::Projection(projection.include_nodes()),
            Operation::Filter(_) | Operation::OrderBy(_) | Operation::Skip(_) | Operation::Take(_) => {
                return Ok(None);
            }
        };
        Ok(Some(declaration))
    }

    /// The eager-loads `operations` ask the engine for, in application order.
    ///
    /// Continuations are resolved to full paths from the root. A projection
    /// discards the includes applied before it, as it does for the tree.
    pub fn planned_includes(&self, operations: &[Operation]) -> QueryResult<Vec<PlannedInclude>> {
        let mut planned = Vec::new();
        let mut tail: Option<Vec<SmolStr>> = None;

        for operation in operations {
            let (base, chain) = match self.declaration(operation)? {
                Some(Declaration::Root(chain)) => (Vec::new(), chain),
                Some(Declaration::Continuation(chain)) => match tail.take() {
                    Some(base) => (base, chain),
                    None => {
                        return Err(QueryError::dangling_continuation(chain.segments().join(".")));
                    }
                },
                Some(Declaration::Projection(_)) => {
                    planned.clear();
                    tail = None;
                    continue;
                }
                None => continue,
            };

            let (segments, options) = chain.into_parts();
            let mut path = base;
            path.extend(segments);
            tail = Some(path.clone());
            planned.push(PlannedInclude { path, options });
        }
        Ok(planned)
    }

    /// Parse either surface form.
    pub fn parse_arg(&self, arg: &IncludeArg) -> QueryResult<LinearChain> {
        match arg {
            IncludeArg::Path(path) => self.parse_str(path),
            IncludeArg::Expr(expr) => self.parse_expr(expr),
        }
    }

    /// Parse a dotted string path.
    pub fn parse_str(&self, path: &str) -> QueryResult<LinearChain> {
        if path.is_empty() {
            return Err(QueryError::invalid_path(path, "path is empty"));
        }

        let mut segments = Vec::new();
        for (position, segment) in path.split(self.separator.as_str()).enumerate() {
            if segment.is_empty() {
                return Err(QueryError::invalid_path(
                    path,
                    format!("segment {} is empty", position + 1),
                ));
            }
            if segment.trim() != segment {
                return Err(QueryError::invalid_path(
                    path,
                    format!("segment `{}` has surrounding whitespace", segment),
                ));
            }
            segments.push(SmolStr::new(segment));
        }

        self.finish(path, segments, IncludeOptions::new())
    }

    /// Parse a path expression.
    pub fn parse_expr(&self, expr: &PathExpr) -> QueryResult<LinearChain> {
        let mut wrappers = Vec::new();
        let mut current = expr;
        while let Some(source) = wrapped_source(current) {
            if !self.capabilities.allows(current) {
                return Err(QueryError::unsupported_declaration(
                    expr.to_string(),
                    format!("the engine cannot apply `{}` to an include", wrapper_name(current)),
                ));
            }
            wrappers.push(current);
            current = source;
        }

        let mut segments = Vec::new();
        loop {
            current = match current {
                PathExpr::Parameter => break,
                PathExpr::Member { target, name } => {
                    segments.push(name.clone());
                    target.as_ref()
                }
                PathExpr::Cast { operand, .. } => operand.as_ref(),
                PathExpr::Call { method, .. } => {
                    return Err(QueryError::unsupported_declaration(
                        expr.to_string(),
                        format!("`{}` cannot wrap an include", method),
                    ));
                }
                wrapper => {
                    return Err(QueryError::unsupported_declaration(
                        expr.to_string(),
                        format!(
                            "`{}` may only wrap the end of an include, not sit inside its path",
                            wrapper_name(wrapper)
                        ),
                    ));
                }
            };
        }

        if segments.is_empty() {
            return Err(QueryError::unsupported_declaration(
                expr.to_string(),
                "the declaration does not end in a property access",
            ));
        }
        segments.reverse();

        // Wrappers were collected outermost first; apply them innermost first.
        let options = wrappers
            .into_iter()
            .rev()
            .fold(IncludeOptions::new(), |options, wrapper| match wrapper {
                PathExpr::Where { predicate, .. } => options.r#where(predicate.clone()),
                PathExpr::OrderBy { field, .. } | PathExpr::OrderByDescending { field, .. } => {
                    options.order_by(field.clone())
                }
                PathExpr::ThenBy { field, .. } | PathExpr::ThenByDescending { field, .. } => {
                    options.then_by(field.clone())
                }
                PathExpr::Skip { n, .. } => options.skip(*n),
                PathExpr::Take { n, .. } => options.take(*n),
                _ => options,
            });

        self.finish(&expr.to_string(), segments, options)
    }

    fn finish(
        &self,
        path: &str,
        segments: Vec<SmolStr>,
        options: IncludeOptions,
    ) -> QueryResult<LinearChain> {
        if let Some(max) = self.max_depth {
            if segments.len() > max {
                return Err(QueryError::invalid_path(
                    path,
                    format!("{} segments exceed the maximum depth of {}", segments.len(), max),
                ));
            }
        }

        trace!(path = %path, segments = segments.len(), shaped = !options.is_empty(), "parsed include");
        Ok(LinearChain { segments, options })
    }
}

/// The expression a shaping wrapper wraps, or `None` for anything else.
fn wrapped_source(expr: &PathExpr) -> Option<&PathExpr> {
    match expr {
        PathExpr::Where { source, .. }
        | PathExpr::OrderBy { source, .. }
        | PathExpr::OrderByDescending { source, .. }
        | PathExpr::ThenBy { source, .. }
        | PathExpr::ThenByDescending { source, .. }
        | PathExpr::Skip { source, .. }
        | PathExpr::Take { source, .. } => Some(source.as_ref()),
        PathExpr::Parameter | PathExpr::Member { .. } | PathExpr::Cast { .. } | PathExpr::Call { .. } => None,
    }
}

fn wrapper_name(expr: &PathExpr) -> &'static str {
    match expr {
        PathExpr::Where { .. } => "Where",
        PathExpr::OrderBy { .. } => "OrderBy",
        PathExpr::OrderByDescending { .. } => "OrderByDescending",
        PathExpr::ThenBy { .. } => "ThenBy",
        PathExpr::ThenByDescending { .. } => "ThenByDescending",
        PathExpr::Skip { .. } => "Skip",
        PathExpr::Take { .. } => "Take",
        PathExpr::Parameter => "parameter",
        PathExpr::Member { .. } => "member access",
        PathExpr::Cast { .. } => "cast",
        PathExpr::Call { .. } => "call",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::filter::Filter;
    use crate::pagination::Pagination;
    use crate::projection::Projection;

    fn segments(chain: &LinearChain) -> Vec<&str> {
        chain.segments().iter().map(SmolStr::as_str).collect()
    }

    #[test]
    fn test_multi_hop_member_chain() {
        let chain = PathParser::new()
            .parse_expr(&PathExpr::members(["CasesAssigned", "CaseProducts", "Case"]))
            .expect("valid path");
        assert_eq!(segments(&chain), vec!["CasesAssigned", "CaseProducts", "Case"]);
        assert_eq!(chain.head(), "CasesAssigned");
        assert_eq!(chain.tail(), "Case");
        assert!(chain.options().is_empty());
    }

    #[test]
    fn test_wrappers_are_stripped_into_options() {
        let expr = PathExpr::members(["CasesAssigned"])
            .filter(Filter::eq("status", "open"))
            .order_by("opened_at")
            .then_by_desc("case_key")
            .skip(2)
            .take(5);
        let chain = PathParser::new().parse_expr(&expr).expect("valid path");

        assert_eq!(segments(&chain), vec!["CasesAssigned"]);
        let options = chain.options();
        assert_eq!(options.filter, Some(Filter::eq("status", "open")));
        assert_eq!(
            options.order_by.as_ref().map(ToString::to_string).as_deref(),
            Some("opened_at ASC, case_key DESC")
        );
        assert_eq!(options.pagination, Some(Pagination { skip: Some(2), take: Some(5) }));
    }

    #[test]
    fn test_cast_is_transparent() {
        let expr = PathExpr::param().cast("Manager").member("Reports");
        let chain = PathParser::new().parse_expr(&expr).expect("valid path");
        assert_eq!(segments(&chain), vec!["Reports"]);
    }

    #[test]
    fn test_unknown_wrapper_is_rejected() {
        let expr = PathExpr::members(["CasesAssigned"]).call("Distinct");
        let err = PathParser::new().parse_expr(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedDeclaration);
        assert!(err.message.contains("Distinct"));
    }

    #[test]
    fn test_bare_parameter_is_rejected() {
        let err = PathParser::new().parse_expr(&PathExpr::param().take(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedDeclaration);
    }

    #[test]
    fn test_wrapper_inside_chain_is_rejected() {
        let expr = PathExpr::members(["CasesAssigned"])
            .filter(Filter::is_null("closed_at"))
            .member("AssignedTo");
        let err = PathParser::new().parse_expr(&expr).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedDeclaration);
        assert!(err.message.contains("Where"));
    }

    #[test]
    fn test_engine_capabilities_limit_wrappers() {
        let parser = PathParser::new().capabilities(IncludeCapabilities {
            take: false,
            ..IncludeCapabilities::all()
        });
        assert!(parser.parse_expr(&PathExpr::members(["Cases"]).skip(1)).is_ok());
        let err = parser
            .parse_expr(&PathExpr::members(["Cases"]).take(1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedDeclaration);
        assert!(err.message.contains("Take"));
    }

    #[test]
    fn test_dotted_paths() {
        let parser = PathParser::new();
        let chain = parser.parse_str("CasesAssigned.CaseProducts.Case").expect("valid path");
        assert_eq!(segments(&chain), vec!["CasesAssigned", "CaseProducts", "Case"]);

        for bad in ["", "A..B", "A.", ".A", "A. B"] {
            let err = parser.parse_str(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidIncludePath, "path {:?}", bad);
        }
    }

    #[test]
    fn test_custom_separator() {
        let parser = PathParser::new().separator("/");
        let chain = parser.parse_str("A/B").expect("valid path");
        assert_eq!(segments(&chain), vec!["A", "B"]);
        assert_eq!(segments(&parser.parse_str("A.B").expect("one segment")), vec!["A.B"]);
    }

    #[test]
    fn test_max_depth() {
        let parser = PathParser::new().max_depth(Some(2));
        assert!(parser.parse_str("A.B").is_ok());
        let err = parser.parse_str("A.B.C").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIncludePath);
        assert!(parser.parse_expr(&PathExpr::members(["A", "B", "C"])).is_err());
    }

    #[test]
    fn test_attach_places_below_under_tail() {
        let chain = PathParser::new().parse_str("A.B").expect("valid path");
        let tree = chain.attach(IncludeTree::chain(["C", "D"]));
        assert_eq!(tree.name(), Some("A"));
        assert!(tree.path(["B", "C", "D"]).is_some());
    }

    #[test]
    fn test_declaration_kinds() {
        let parser = PathParser::new();
        assert!(matches!(
            parser.declaration(&Operation::Include("A".into())),
            Ok(Some(Declaration::Root(_)))
        ));
        assert!(matches!(
            parser.declaration(&Operation::ThenInclude(PathExpr::members(["B"]))),
            Ok(Some(Declaration::Continuation(_)))
        ));
        assert!(matches!(
            parser.declaration(&Operation::Select(Projection::new().entity("Company"))),
            Ok(Some(Declaration::Projection(nodes))) if nodes.len() == 1
        ));
        assert!(matches!(parser.declaration(&Operation::Skip(1)), Ok(None)));
    }

    #[test]
    fn test_planned_includes_resolve_continuations() {
        let ops = vec![
            Operation::Include(IncludeArg::Expr(
                PathExpr::members(["CasesAssigned"]).filter(Filter::eq("status", "open")),
            )),
            Operation::ThenInclude(PathExpr::members(["CaseProducts"]).take(3)),
            Operation::Skip(10),
            Operation::Include("Company.Owner".into()),
        ];
        let planned = PathParser::new().planned_includes(&ops).expect("valid");

        let shown: Vec<_> = planned.iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec![
                "CasesAssigned WHERE status = 'open'",
                "CasesAssigned.CaseProducts TAKE 3",
                "Company.Owner",
            ]
        );
        assert_eq!(planned[1].options.pagination, Some(Pagination { skip: None, take: Some(3) }));
    }

    #[test]
    fn test_planned_includes_after_projection() {
        let parser = PathParser::new();
        let ops = vec![
            Operation::Include("CasesReported".into()),
            Operation::Select(Projection::new().entity("Company")),
            Operation::Include("CasesAssigned".into()),
        ];
        let planned = parser.planned_includes(&ops).expect("valid");
        assert_eq!(planned.iter().map(PlannedInclude::dotted).collect::<Vec<_>>(), vec!["CasesAssigned"]);

        let err = parser
            .planned_includes(&[Operation::ThenInclude(PathExpr::members(["Owner"]))])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DanglingContinuation);
    }
}
