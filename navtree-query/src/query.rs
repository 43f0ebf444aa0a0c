//! Query builder with eager-load declarations.
//!
//! A [`Query`] records its pipeline as a list of [`Operation`]s in the order
//! they were applied, hands that list to the engine on execution, and
//! replays it as an [`IncludeTree`] on request.
//!
//! ```rust
//! use navtree_query::prelude::*;
//!
//! struct Person;
//! struct Case;
//! impl Model for Person {
//!     const MODEL_NAME: &'static str = "Person";
//! }
//! impl Model for Case {
//!     const MODEL_NAME: &'static str = "Case";
//! }
//!
//! const CASES_ASSIGNED: Nav<Person, Case, Many> = Nav::new("CasesAssigned");
//! const ASSIGNED_TO: Nav<Case, Person, One> = Nav::new("AssignedTo");
//!
//! let query = Query::<Person, _>::new(EmptyEngine)
//!     .include(CASES_ASSIGNED.path().take(5))
//!     .then_include(ASSIGNED_TO)
//!     .into_query();
//!
//! let tree = query.include_tree().unwrap();
//! assert!(tree.child("CasesAssigned").child("AssignedTo").is_some());
//! ```

use std::marker::PhantomData;
use std::sync::OnceLock;

use tracing::debug;

use crate::config::NavtreeConfig;
use crate::engine::{BoxFuture, BoxStream, EmptyEngine, QueryEngine, QueryPlan};
use crate::error::{QueryError, QueryResult};
use crate::expr::PathExpr;
use crate::filter::Filter;
use crate::model::{Cardinality, Model, Path};
use crate::operation::{IncludeArg, Operation, OperationGraph};
use crate::projection::Projection;
use crate::separate::{QueryProvider, SeparatelyIncluded};
use crate::tree::{IncludeTree, IncludeTreeBuilder};
use crate::types::OrderBy;

/// A query over model `M`, executed by engine `E`.
#[derive(Debug)]
pub struct Query<M, E> {
    pub(crate) provider: QueryProvider<E>,
    pub(crate) operations: Vec<Operation>,
    pub(crate) builder: IncludeTreeBuilder,
    pub(crate) separate_error: Option<QueryError>,
    pub(crate) tree: OnceLock<QueryResult<IncludeTree>>,
    _model: PhantomData<fn() -> M>,
}

/// Results paired with the include tree that describes them.
#[derive(Debug)]
pub struct Loaded<M> {
    /// The loaded rows.
    pub items: Vec<M>,
    /// Which navigation properties of `items` were populated.
    pub tree: IncludeTree,
}

/// Anything that finishes as a [`Query`]: the query itself or a
/// continuation handle.
pub trait IntoQuery<M, E> {
    /// Unwrap into the underlying query.
    fn into_query(self) -> Query<M, E>;
}

impl<M: Model, E: QueryEngine> IntoQuery<M, E> for Query<M, E> {
    fn into_query(self) -> Query<M, E> {
        self
    }
}

impl<M, E> Query<M, E> {
    /// Pipeline in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Root of the side-channel declarations, once any were made.
    pub fn separate_includes(&self) -> Option<&IncludeTree> {
        self.provider.separate_includes()
    }

    /// The engine, possibly decorated by the side channel.
    pub fn provider(&self) -> &QueryProvider<E> {
        &self.provider
    }

    /// The undecorated engine.
    pub fn engine(&self) -> &E {
        self.provider.engine()
    }
}

impl<M: Model, E: QueryEngine> Query<M, E> {
    /// Start a query over `engine`.
    pub fn new(engine: E) -> Self {
        let builder = IncludeTreeBuilder::new().restrict_to(engine.capabilities());
        Self {
            provider: QueryProvider::Direct(engine),
            operations: Vec::new(),
            builder,
            separate_error: None,
            tree: OnceLock::new(),
            _model: PhantomData,
        }
    }

    /// Apply `navtree.toml` settings to tree building.
    pub fn with_config(self, config: &NavtreeConfig) -> Self {
        let builder = IncludeTreeBuilder::from_config(config);
        self.with_builder(builder)
    }

    /// Use a custom tree builder. It is narrowed to the engine's capabilities.
    pub fn with_builder(mut self, builder: IncludeTreeBuilder) -> Self {
        self.builder = builder.restrict_to(self.provider.capabilities());
        self.reset_tree();
        self
    }

    /// Append an operation.
    pub fn push(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self.reset_tree();
        self
    }

    pub(crate) fn reset_tree(&mut self) {
        self.tree = OnceLock::new();
    }

    /// Eager-load a navigation path off the element type.
    pub fn include<T: Model, C: Cardinality>(
        self,
        path: impl Into<Path<M, T, C>>,
    ) -> Included<M, E, T, C> {
        let expr = path.into().into_expr();
        Included::new(self.push(Operation::Include(IncludeArg::Expr(expr))))
    }

    /// Eager-load a dotted string path such as `"CasesAssigned.CaseProducts"`.
    pub fn include_str(self, path: &str) -> Self {
        self.push(Operation::Include(IncludeArg::Path(path.into())))
    }

    /// Eager-load an untyped path expression.
    pub fn include_expr(self, expr: PathExpr) -> Self {
        self.push(Operation::Include(IncludeArg::Expr(expr)))
    }

    /// Filter the queried rows.
    pub fn filter(self, filter: Filter) -> Self {
        self.push(Operation::Filter(filter))
    }

    /// Order the queried rows.
    pub fn order_by(self, order: impl Into<OrderBy>) -> Self {
        self.push(Operation::OrderBy(order.into()))
    }

    /// Skip rows.
    pub fn skip(self, n: u64) -> Self {
        self.push(Operation::Skip(n))
    }

    /// Take at most `n` rows.
    pub fn take(self, n: u64) -> Self {
        self.push(Operation::Take(n))
    }

    /// Project the element type. Includes applied before this are dropped
    /// from the tree.
    pub fn select(self, projection: Projection) -> Self {
        self.push(Operation::Select(projection))
    }

    /// The include tree for this query, built on first request.
    ///
    /// Reports the first error from the side channel or the declarations.
    pub fn include_tree(&self) -> QueryResult<&IncludeTree> {
        self.tree
            .get_or_init(|| self.build_tree())
            .as_ref()
            .map_err(|err| err.clone())
    }

    /// Consume the query and return its include tree.
    pub fn into_include_tree(mut self) -> QueryResult<IncludeTree> {
        match self.tree.take() {
            Some(result) => result,
            None => self.build_tree(),
        }
    }

    fn build_tree(&self) -> QueryResult<IncludeTree> {
        if let Some(err) = &self.separate_error {
            return Err(err.clone());
        }
        self.builder
            .build(self)
            .map_err(|err| err.with_model(M::MODEL_NAME))
    }

    /// The plan handed to the engine.
    ///
    /// Includes in the plan resolve with this query's separator and depth
    /// settings.
    pub fn plan(&self) -> QueryPlan<'_> {
        QueryPlan::new::<M>(&self.operations).with_parser(self.builder.path_parser())
    }

    /// Execute on the calling thread.
    pub fn fetch(&self) -> QueryResult<Vec<M>> {
        debug!(model = M::MODEL_NAME, operations = self.operations.len(), "executing query");
        self.provider.execute(self.plan())
    }

    /// Execute asynchronously.
    pub fn fetch_async(&self) -> BoxFuture<'_, QueryResult<Vec<M>>> {
        debug!(model = M::MODEL_NAME, operations = self.operations.len(), "executing query async");
        self.provider.execute_async(self.plan())
    }

    /// Execute as a stream of rows.
    pub fn stream(&self) -> BoxStream<'_, QueryResult<M>> {
        debug!(model = M::MODEL_NAME, operations = self.operations.len(), "streaming query");
        self.provider.execute_stream(self.plan())
    }

    /// Build the tree, execute, and return both.
    ///
    /// Declaration errors are reported before the engine is called.
    pub async fn load(self) -> QueryResult<Loaded<M>> {
        self.include_tree()?;
        let items = self.fetch_async().await?;
        let tree = self.into_include_tree()?;
        Ok(Loaded { items, tree })
    }
}

impl<M, E> OperationGraph for Query<M, E> {
    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn separate_includes(&self) -> Option<&IncludeTree> {
        self.provider.separate_includes()
    }
}

/// Handle returned by [`Query::include`]; `then_include` continues from
/// the included target `T`.
#[derive(Debug)]
pub struct Included<M, E, T, C> {
    query: Query<M, E>,
    _target: PhantomData<fn() -> (T, C)>,
}

impl<M, E, T, C> Included<M, E, T, C> {
    fn new(query: Query<M, E>) -> Self {
        Self {
            query,
            _target: PhantomData,
        }
    }
}

impl<M: Model, E: QueryEngine, T: Model, C: Cardinality> Included<M, E, T, C> {
    /// Eager-load a path off the previously included target.
    pub fn then_include<U: Model, C2: Cardinality>(
        self,
        path: impl Into<Path<T, U, C2>>,
    ) -> Included<M, E, U, C2> {
        let expr = path.into().into_expr();
        Included::new(self.query.push(Operation::ThenInclude(expr)))
    }
}

forward_to_query!(Included);

impl IncludeTree {
    /// An empty query over model `M`, for building trees without a data source.
    pub fn query_for<M: Model>() -> Query<M, EmptyEngine> {
        Query::new(EmptyEngine)
    }

    /// Build a tree by declaring includes on an empty query.
    ///
    /// ```rust
    /// use navtree_query::prelude::*;
    ///
    /// struct Person;
    /// impl Model for Person {
    ///     const MODEL_NAME: &'static str = "Person";
    /// }
    ///
    /// let tree = IncludeTree::for_model::<Person, _>(|q| q.include_str("Company.Owner")).unwrap();
    /// assert_eq!(tree.paths(), vec!["Company.Owner"]);
    /// ```
    pub fn for_model<M, Q>(build: impl FnOnce(Query<M, EmptyEngine>) -> Q) -> QueryResult<IncludeTree>
    where
        M: Model,
        Q: IntoQuery<M, EmptyEngine>,
    {
        build(Self::query_for::<M>()).into_query().into_include_tree()
    }
}
