//! Side-channel include declarations.
//!
//! Sometimes the caller loads related rows through some other route (a
//! second query, a cache) and still wants the include tree to say they are
//! present. `included_separately` records such paths without adding
//! anything to the pipeline the engine sees. The paths are kept in a root
//! [`IncludeTree`] carried by the query's provider; the tree builder merges
//! that root into the tree it builds.
//!
//! The first side-channel declaration wraps the engine in
//! [`SeparateIncludes`]. The wrapper forwards every execution call
//! unchanged.

use std::marker::PhantomData;

use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::engine::{BoxFuture, BoxStream, IncludeCapabilities, QueryEngine, QueryPlan};
use crate::error::{QueryError, QueryResult};
use crate::expr::PathExpr;
use crate::filter::Filter;
use crate::model::{Cardinality, Model, One, Path};
use crate::operation::{Operation, OperationGraph};
use crate::projection::Projection;
use crate::query::{Included, IntoQuery, Query};
use crate::tree::IncludeTree;
use crate::types::OrderBy;

/// An engine decorated with a root of side-channel include declarations.
#[derive(Debug, Clone)]
pub struct SeparateIncludes<E> {
    inner: E,
    root: IncludeTree,
}

impl<E> SeparateIncludes<E> {
    /// Wrap `inner` with an empty declaration root.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            root: IncludeTree::new(),
        }
    }

    /// The wrapped engine.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwrap, discarding the declarations.
    pub fn into_inner(self) -> E {
        self.inner
    }

    /// The declarations made so far.
    pub fn tree(&self) -> &IncludeTree {
        &self.root
    }

    pub(crate) fn tree_mut(&mut self) -> &mut IncludeTree {
        &mut self.root
    }
}

impl<E: QueryEngine> QueryEngine for SeparateIncludes<E> {
    fn execute<T: Model>(&self, plan: QueryPlan<'_>) -> QueryResult<Vec<T>> {
        trace!(model = plan.model, "forwarding past side-channel includes");
        self.inner.execute(plan)
    }

    fn execute_async<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>> {
        trace!(model = plan.model, "forwarding past side-channel includes");
        self.inner.execute_async(plan)
    }

    fn execute_stream<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>> {
        trace!(model = plan.model, "forwarding past side-channel includes");
        self.inner.execute_stream(plan)
    }

    fn capabilities(&self) -> IncludeCapabilities {
        self.inner.capabilities()
    }
}

/// The engine a query runs against: either as given, or decorated with
/// side-channel declarations.
#[derive(Debug, Clone)]
pub enum QueryProvider<E> {
    /// No side-channel declarations.
    Direct(E),
    /// At least one side-channel declaration was made.
    Separate(SeparateIncludes<E>),
}

impl<E> QueryProvider<E> {
    /// The undecorated engine.
    pub fn engine(&self) -> &E {
        match self {
            Self::Direct(engine) => engine,
            Self::Separate(separate) => separate.inner(),
        }
    }

    /// Unwrap into the undecorated engine.
    pub fn into_engine(self) -> E {
        match self {
            Self::Direct(engine) => engine,
            Self::Separate(separate) => separate.into_inner(),
        }
    }

    /// Whether the engine has been decorated.
    pub fn is_separate(&self) -> bool {
        matches!(self, Self::Separate(_))
    }

    /// Root of the side-channel declarations.
    pub fn separate_includes(&self) -> Option<&IncludeTree> {
        match self {
            Self::Direct(_) => None,
            Self::Separate(separate) => Some(separate.tree()),
        }
    }

    /// Mutate the declaration root, decorating the engine first if needed.
    pub(crate) fn with_separate<R>(self, f: impl FnOnce(&mut IncludeTree) -> R) -> (Self, R) {
        let mut separate = match self {
            Self::Separate(separate) => separate,
            Self::Direct(engine) => {
                crate::navtree_debug!("decorating engine for side-channel includes");
                SeparateIncludes::new(engine)
            }
        };
        let out = f(separate.tree_mut());
        (Self::Separate(separate), out)
    }
}

impl<E: QueryEngine> QueryEngine for QueryProvider<E> {
    fn execute<T: Model>(&self, plan: QueryPlan<'_>) -> QueryResult<Vec<T>> {
        match self {
            Self::Direct(engine) => engine.execute(plan),
            Self::Separate(separate) => separate.execute(plan),
        }
    }

    fn execute_async<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxFuture<'a, QueryResult<Vec<T>>> {
        match self {
            Self::Direct(engine) => engine.execute_async(plan),
            Self::Separate(separate) => separate.execute_async(plan),
        }
    }

    fn execute_stream<'a, T: Model>(&'a self, plan: QueryPlan<'a>) -> BoxStream<'a, QueryResult<T>> {
        match self {
            Self::Direct(engine) => engine.execute_stream(plan),
            Self::Separate(separate) => separate.execute_stream(plan),
        }
    }

    fn capabilities(&self) -> IncludeCapabilities {
        self.engine().capabilities()
    }
}

impl<M: Model, E: QueryEngine> Query<M, E> {
    /// Declare that a path is loaded by other means.
    ///
    /// The path shows up in the include tree but is never sent to the
    /// engine. Shaping wrappers on the path are accepted and ignored.
    pub fn included_separately<T: Model, C: Cardinality>(
        self,
        path: impl Into<Path<M, T, C>>,
    ) -> SeparatelyIncluded<M, E, T, C> {
        let expr = path.into().into_expr();
        self.declare_separately(Vec::new(), &expr)
    }

    /// Declare an untyped path expression as loaded by other means.
    pub fn included_separately_expr(self, expr: PathExpr) -> Self {
        self.declare_separately::<M, One>(Vec::new(), &expr).query
    }

    fn declare_separately<T, C>(mut self, base: Vec<SmolStr>, expr: &PathExpr) -> SeparatelyIncluded<M, E, T, C> {
        // Never sent to the engine, so any wrapper is acceptable here.
        let parser = self.builder.path_parser().clone().capabilities(IncludeCapabilities::all());
        let chain = match parser.parse_expr(expr) {
            Ok(chain) => chain,
            Err(err) => {
                warn!(path = %expr, error = %err, "rejected side-channel include");
                self.record_separate_error(err.with_model(M::MODEL_NAME));
                return SeparatelyIncluded::new(self, None);
            }
        };

        let segments = chain.segments().to_vec();
        let head = chain.into_tree();

        let (provider, attached) = self.provider.with_separate(|root| match root.path_mut(&base) {
            Some(parent) => {
                parent.add_linear_child(head);
                true
            }
            None => false,
        });
        self.provider = provider;
        self.reset_tree();

        if !attached {
            let err = QueryError::internal("side-channel continuation lost its parent")
                .with_path(base.join("."))
                .with_model(M::MODEL_NAME);
            self.record_separate_error(err);
            return SeparatelyIncluded::new(self, None);
        }

        let mut tail = base;
        tail.extend(segments);
        trace!(path = %tail.join("."), "side-channel include");
        SeparatelyIncluded::new(self, Some(tail))
    }

    fn record_separate_error(&mut self, err: QueryError) {
        if self.separate_error.is_none() {
            self.separate_error = Some(err);
        }
        self.reset_tree();
    }
}

/// Handle returned by [`Query::included_separately`]; `then_included`
/// continues the side-channel path from target `T`.
#[derive(Debug)]
pub struct SeparatelyIncluded<M, E, T, C> {
    query: Query<M, E>,
    tail: Option<Vec<SmolStr>>,
    _target: PhantomData<fn() -> (T, C)>,
}

impl<M, E, T, C> SeparatelyIncluded<M, E, T, C> {
    fn new(query: Query<M, E>, tail: Option<Vec<SmolStr>>) -> Self {
        Self {
            query,
            tail,
            _target: PhantomData,
        }
    }
}

impl<M: Model, E: QueryEngine, T: Model, C: Cardinality> SeparatelyIncluded<M, E, T, C> {
    /// Continue the side-channel path from the previously declared target.
    ///
    /// After a rejected declaration the chain is inert; the error is
    /// reported by [`Query::include_tree`].
    pub fn then_included<U: Model, C2: Cardinality>(
        self,
        path: impl Into<Path<T, U, C2>>,
    ) -> SeparatelyIncluded<M, E, U, C2> {
        let expr = path.into().into_expr();
        match self.tail {
            Some(tail) => self.query.declare_separately(tail, &expr),
            None => SeparatelyIncluded::new(self.query, None),
        }
    }
}

forward_to_query!(SeparatelyIncluded);
