//! The execution boundary.
//!
//! Fetching rows is not this crate's job. A [`QueryEngine`] receives a
//! [`QueryPlan`] (the model name and the pipeline in application order) and
//! runs it synchronously, as a future, or as a stream. The plan also resolves
//! each include to its full path and shaping through
//! [`QueryPlan::includes`]. Engines also report
//! which include shaping wrappers they can execute through
//! [`IncludeCapabilities`]; the path parser rejects the rest.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::QueryResult;
use crate::expr::PathExpr;
use crate::model::Model;
use crate::operation::Operation;
use crate::tree::{PathParser, PlannedInclude};

/// A boxed future for async engine calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed stream for streaming engine calls.
pub type BoxStream<'a, T> = futures::stream::BoxStream<'a, T>;

/// What the engine is asked to run.
#[derive(Debug, Clone, Copy)]
pub struct QueryPlan<'a> {
    /// Name of the queried model.
    pub model: &'static str,
    /// The pipeline, in application order.
    pub operations: &'a [Operation],
    parser: Option<&'a PathParser>,
}

impl<'a> QueryPlan<'a> {
    /// Create a plan for model `M`.
    pub fn new<M: Model>(operations: &'a [Operation]) -> Self {
        Self {
            model: M::MODEL_NAME,
            operations,
            parser: None,
        }
    }

    /// Resolve include paths with `parser` instead of the default one.
    pub fn with_parser(mut self, parser: &'a PathParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Every eager-load in the pipeline as a full path with its shaping.
    pub fn includes(&self) -> QueryResult<Vec<PlannedInclude>> {
        match self.parser {
            Some(parser) => parser.planned_includes(self.operations),
            None => PathParser::new().planned_includes(self.operations),
        }
    }
}

/// Include wrappers an engine can execute on a loaded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludeCapabilities {
    /// `Where` on an include.
    pub filter: bool,
    /// `OrderBy`, `OrderByDescending`, `ThenBy`, `ThenByDescending` on an include.
    pub order: bool,
    /// `Skip` on an include.
    pub skip: bool,
    /// `Take` on an include.
    pub take: bool,
}

impl Default for IncludeCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl IncludeCapabilities {
    /// Every wrapper is supported.
    pub const fn all() -> Self {
        Self {
            filter: true,
            order: true,
            skip: true,
            take: true,
        }
    }

    /// Only plain includes are supported.
    pub const fn none() -> Self {
        Self {
            filter: false,
            order: false,
            skip: false,
            take: false,
        }
    }

    /// Wrappers supported by both `self` and `other`.
    pub const fn intersect(self, other: Self) -> Self {
        Self {
            filter: self.filter && other.filter,
            order: self.order && other.order,
            skip: self.skip && other.skip,
            take: self.take && other.take,
        }
    }

    /// Whether the outermost shape of `expr` may wrap an include.
    ///
    /// Anything that is not a shaping wrapper is allowed here; the parser
    /// decides whether it is a valid path.
    pub fn allows(&self, expr: &PathExpr) -> bool {
        match expr {
            PathExpr::Where { .. } => self.filter,
            PathExpr::OrderBy { .. }
            | PathExpr::OrderByDescending { .. }
            | PathExpr::ThenBy { .. }
            | PathExpr::ThenByDescending { .. } => self.order,
            PathExpr::Skip { .. } => self.skip,
            PathExpr::Take { .. } => self.take,
            _ => true,
        }
    }
}

/// Executes query plans.
pub trait QueryEngine: Send + Sync {
    /// Run the plan to completion on the calling thread.
    fn execute<T: Model>(&self, plan: QueryPlan<'_>) -> QueryResult<Vec<T>>;

    /// Run the plan asynchronously.
    fn execute_async<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>>;

    /// Run the plan, yielding rows as they arrive.
    fn execute_stream<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>>;

    /// Include wrappers this engine can execute.
    fn capabilities(&self) -> IncludeCapabilities {
        IncludeCapabilities::default()
    }
}

impl<E: QueryEngine + ?Sized> QueryEngine for &E {
    fn execute<T: Model>(&self, plan: QueryPlan<'_>) -> QueryResult<Vec<T>> {
        (**self).execute(plan)
    }

    fn execute_async<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>> {
        (**self).execute_async(plan)
    }

    fn execute_stream<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>> {
        (**self).execute_stream(plan)
    }

    fn capabilities(&self) -> IncludeCapabilities {
        (**self).capabilities()
    }
}

impl<E: QueryEngine + ?Sized> QueryEngine for Arc<E> {
    fn execute<T: Model>(&self, plan: QueryPlan<'_>) -> QueryResult<Vec<T>> {
        (**self).execute(plan)
    }

    fn execute_async<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>> {
        (**self).execute_async(plan)
    }

    fn execute_stream<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>> {
        (**self).execute_stream(plan)
    }

    fn capabilities(&self) -> IncludeCapabilities {
        (**self).capabilities()
    }
}

/// An engine over an empty source: every query returns no rows.
///
/// Used to build include trees without a data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEngine;

impl QueryEngine for EmptyEngine {
    fn execute<T: Model>(&self, _plan: QueryPlan<'_>) -> QueryResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn execute_async<'a, T: Model>(&'a self, _plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn execute_stream<'a, T: Model>(&'a self, _plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>> {
        Box::pin(futures::stream::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct Person;

    impl Model for Person {
        const MODEL_NAME: &'static str = "Person";
    }

    #[test]
    fn test_capabilities_allow_wrappers() {
        let expr = PathExpr::members(["Cases"]).take(3);
        assert!(IncludeCapabilities::all().allows(&expr));
        assert!(!IncludeCapabilities::none().allows(&expr));
        assert!(IncludeCapabilities::none().allows(&PathExpr::members(["Cases"])));

        let no_order = IncludeCapabilities {
            order: false,
            ..IncludeCapabilities::all()
        };
        assert!(!no_order.allows(&PathExpr::members(["Cases"]).then_by_desc("id")));
        assert!(no_order.allows(&PathExpr::members(["Cases"]).skip(1)));
        assert_eq!(no_order.intersect(IncludeCapabilities::all()), no_order);
        assert_eq!(no_order.intersect(IncludeCapabilities::none()), IncludeCapabilities::none());
    }

    #[test]
    fn test_empty_engine_sync() {
        let rows: Vec<Person> = EmptyEngine.execute(QueryPlan::new::<Person>(&[])).expect("empty");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_plan_resolves_includes() {
        let ops = vec![
            Operation::Include("CasesAssigned".into()),
            Operation::ThenInclude(PathExpr::members(["CaseProducts"]).skip(1).take(2)),
        ];
        let plan = QueryPlan::new::<Person>(&ops);
        let includes = plan.includes().expect("valid");
        assert_eq!(includes.len(), 2);
        assert_eq!(includes[1].dotted(), "CasesAssigned.CaseProducts");
        assert_eq!(includes[1].options.to_string(), "SKIP 1 TAKE 2");

        let parser = PathParser::new().separator("/");
        let ops = vec![Operation::Include("Company/Owner".into())];
        let plan = QueryPlan::new::<Person>(&ops).with_parser(&parser);
        assert_eq!(plan.includes().expect("valid")[0].dotted(), "Company.Owner");
    }

    #[tokio::test]
    async fn test_empty_engine_async_and_stream() {
        let engine = Arc::new(EmptyEngine);
        let plan = QueryPlan::new::<Person>(&[]);
        assert_eq!(plan.model, "Person");

        let rows: Vec<Person> = engine.execute_async(plan).await.expect("empty");
        assert!(rows.is_empty());

        let mut stream = engine.execute_stream::<Person>(plan);
        assert!(stream.next().await.is_none());
    }
}
