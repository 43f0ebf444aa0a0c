//! Typed navigation descriptors.
//!
//! Entity types implement [`Model`] and publish one [`Nav`] constant per
//! navigation property:
//!
//! ```rust
//! use navtree_query::model::{Many, Model, Nav, One};
//!
//! struct Person;
//! struct Case;
//!
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
//! let path = CASES_ASSIGNED.path().take(5);
//! assert_eq!(path.expr().to_string(), "x.CasesAssigned.Take(5)");
//! assert_eq!(ASSIGNED_TO.name(), "AssignedTo");
//! ```
//!
//! A [`Path`] only offers the operations its cardinality allows: `nav` hops
//! through single-valued references, while the shaping wrappers (`filter`,
//! `order_by`, `skip`, `take`, ...) only exist on collection paths.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::expr::PathExpr;
use crate::filter::Filter;

/// An entity type that queries can be built over.
pub trait Model: Send + Sync + 'static {
    /// Name used in logs and in the plan handed to the engine.
    const MODEL_NAME: &'static str;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::One {}
    impl Sealed for super::Many {}
}

/// Cardinality of a navigation property.
pub trait Cardinality: sealed::Sealed + Send + Sync + 'static {
    /// Whether the navigation yields a collection.
    const IS_COLLECTION: bool;
}

/// Marker for single-valued (reference) navigations.
#[derive(Debug, Clone, Copy)]
pub struct One;

/// Marker for collection-valued navigations.
#[derive(Debug, Clone, Copy)]
pub struct Many;

impl Cardinality for One {
    const IS_COLLECTION: bool = false;
}

impl Cardinality for Many {
    const IS_COLLECTION: bool = true;
}

/// A navigation property from `S` to `T` with cardinality `C`.
pub struct Nav<S, T, C> {
    name: &'static str,
    _marker: PhantomData<fn() -> (S, T, C)>,
}

impl<S, T, C> Nav<S, T, C> {
    /// Declare a navigation property by name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The property name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<S: Model, T: Model, C: Cardinality> Nav<S, T, C> {
    /// `x.Name` as a typed path.
    pub fn path(self) -> Path<S, T, C> {
        Path::from_expr(PathExpr::Parameter.member(self.name))
    }
}

impl<S, T, C> Clone for Nav<S, T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T, C> Copy for Nav<S, T, C> {}

impl<S, T, C> fmt::Debug for Nav<S, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nav").field(&self.name).finish()
    }
}

/// A typed path expression rooted at `S`, ending at `T`.
pub struct Path<S, T, C> {
    expr: PathExpr,
    _marker: PhantomData<fn() -> (S, T, C)>,
}

impl<S: Model> Path<S, S, One> {
    /// The bare parameter, as a starting point for casts.
    pub fn root() -> Self {
        Self::from_expr(PathExpr::Parameter)
    }
}

impl<S, T, C> Path<S, T, C> {
    fn from_expr(expr: PathExpr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    /// The untyped expression.
    pub fn expr(&self) -> &PathExpr {
        &self.expr
    }

    /// Consume into the untyped expression.
    pub fn into_expr(self) -> PathExpr {
        self.expr
    }

    /// `(U)self`: view the target as a derived type.
    pub fn cast<U: Model>(self) -> Path<S, U, C> {
        Path::from_expr(self.expr.cast(U::MODEL_NAME))
    }
}

impl<S, T> Path<S, T, One> {
    /// `self.Name`
    pub fn nav<U, C2>(self, nav: Nav<T, U, C2>) -> Path<S, U, C2> {
        Path::from_expr(self.expr.member(nav.name))
    }
}

impl<S, T> Path<S, T, Many> {
    /// `self.Where(predicate)`
    pub fn filter(self, predicate: Filter) -> Self {
        Self::from_expr(self.expr.filter(predicate))
    }

    /// `self.OrderBy(field)`
    pub fn order_by(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::from_expr(self.expr.order_by(field))
    }

    /// `self.OrderByDescending(field)`
    pub fn order_by_desc(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::from_expr(self.expr.order_by_desc(field))
    }

    /// `self.ThenBy(field)`
    pub fn then_by(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::from_expr(self.expr.then_by(field))
    }

    /// `self.ThenByDescending(field)`
    pub fn then_by_desc(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::from_expr(self.expr.then_by_desc(field))
    }

    /// `self.Skip(n)`
    pub fn skip(self, n: u64) -> Self {
        Self::from_expr(self.expr.skip(n))
    }

    /// `self.Take(n)`
    pub fn take(self, n: u64) -> Self {
        Self::from_expr(self.expr.take(n))
    }
}

impl<S: Model, T: Model, C: Cardinality> From<Nav<S, T, C>> for Path<S, T, C> {
    fn from(nav: Nav<S, T, C>) -> Self {
        nav.path()
    }
}

impl<S, T, C> From<Path<S, T, C>> for PathExpr {
    fn from(path: Path<S, T, C>) -> Self {
        path.expr
    }
}

impl<S, T, C> Clone for Path<S, T, C> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<S, T, C> fmt::Debug for Path<S, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Path").field(&self.expr).finish()
    }
}

impl<S, T, C> fmt::Display for Path<S, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person;
    struct Manager;
    struct Case;
    struct Company;

    impl Model for Person {
        const MODEL_NAME: &'static str = "Person";
    }
    impl Model for Manager {
        const MODEL_NAME: &'static str = "Manager";
    }
    impl Model for Case {
        const MODEL_NAME: &'static str = "Case";
    }
    impl Model for Company {
        const MODEL_NAME: &'static str = "Company";
    }

    const CASES: Nav<Person, Case, Many> = Nav::new("CasesAssigned");
    const COMPANY: Nav<Person, Company, One> = Nav::new("Company");
    const EMPLOYEES: Nav<Company, Person, Many> = Nav::new("Employees");
    const REPORTS: Nav<Manager, Person, Many> = Nav::new("Reports");

    #[test]
    fn test_nav_chain_through_reference() {
        let path = COMPANY.path().nav(EMPLOYEES);
        assert_eq!(path.expr(), &PathExpr::members(["Company", "Employees"]));
    }

    #[test]
    fn test_collection_wrappers() {
        let path = CASES
            .path()
            .filter(Filter::eq("status", "open"))
            .order_by("opened_at")
            .then_by_desc("case_key")
            .skip(1)
            .take(10);
        assert_eq!(
            path.to_string(),
            "x.CasesAssigned.Where(status = 'open').OrderBy(opened_at).ThenByDescending(case_key).Skip(1).Take(10)"
        );
    }

    #[test]
    fn test_cast_from_root() {
        let path = Path::<Person, Person, One>::root().cast::<Manager>().nav(REPORTS);
        assert_eq!(path.to_string(), "((Manager)x).Reports");
    }

    #[test]
    fn test_cardinality_markers() {
        assert!(Many::IS_COLLECTION);
        assert!(!One::IS_COLLECTION);
        assert_eq!(CASES.name(), "CasesAssigned");
    }
}
