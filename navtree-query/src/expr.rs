//! Path expressions: navigation-property access over a lambda parameter.
//!
//! A [`PathExpr`] is the untyped form of an include declaration such as
//! `x => x.CasesAssigned.Where(c => c.Open).Take(5)`. Typed paths built with
//! [`crate::model::Path`] lower into this shape; the parser in
//! [`crate::tree::parser`] consumes it.

use std::borrow::Cow;
use std::fmt;

use smol_str::SmolStr;

use crate::filter::Filter;
use crate::types::OrderByField;

/// An expression over the declaration's parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum PathExpr {
    /// The bare lambda parameter (`x`).
    Parameter,
    /// Property access (`target.name`).
    Member {
        /// Expression whose property is read.
        target: Box<PathExpr>,
        /// Navigation-property name.
        name: SmolStr,
    },
    /// Type cast (`(Derived)operand`). Transparent to the tree.
    Cast {
        /// Expression being cast.
        operand: Box<PathExpr>,
        /// Target type name, for display only.
        ty: &'static str,
    },
    /// Predicate filter over a collection (`source.Where(..)`).
    Where {
        /// Filtered collection.
        source: Box<PathExpr>,
        /// Predicate.
        predicate: Filter,
    },
    /// Primary ascending sort.
    OrderBy {
        /// Sorted collection.
        source: Box<PathExpr>,
        /// Sort key.
        field: OrderByField,
    },
    /// Primary descending sort.
    OrderByDescending {
        /// Sorted collection.
        source: Box<PathExpr>,
        /// Sort key.
        field: OrderByField,
    },
    /// Secondary ascending sort.
    ThenBy {
        /// Sorted collection.
        source: Box<PathExpr>,
        /// Sort key.
        field: OrderByField,
    },
    /// Secondary descending sort.
    ThenByDescending {
        /// Sorted collection.
        source: Box<PathExpr>,
        /// Sort key.
        field: OrderByField,
    },
    /// Skip the first `n` elements.
    Skip {
        /// Paged collection.
        source: Box<PathExpr>,
        /// Number of elements to skip.
        n: u64,
    },
    /// Take at most `n` elements.
    Take {
        /// Paged collection.
        source: Box<PathExpr>,
        /// Number of elements to take.
        n: u64,
    },
    /// Any other method call wrapped around an expression.
    Call {
        /// Receiver of the call.
        source: Box<PathExpr>,
        /// Method name.
        method: SmolStr,
    },
}

impl PathExpr {
    /// The bare parameter.
    pub fn param() -> Self {
        Self::Parameter
    }

    /// `self.name`
    pub fn member(self, name: impl Into<SmolStr>) -> Self {
        Self::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// `(ty)self`
    pub fn cast(self, ty: &'static str) -> Self {
        Self::Cast {
            operand: Box::new(self),
            ty,
        }
    }

    /// `self.Where(predicate)`
    pub fn filter(self, predicate: Filter) -> Self {
        Self::Where {
            source: Box::new(self),
            predicate,
        }
    }

    /// `self.OrderBy(field)`
    pub fn order_by(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::OrderBy {
            source: Box::new(self),
            field: OrderByField::asc(field),
        }
    }

    /// `self.OrderByDescending(field)`
    pub fn order_by_desc(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::OrderByDescending {
            source: Box::new(self),
            field: OrderByField::desc(field),
        }
    }

    /// `self.ThenBy(field)`
    pub fn then_by(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::ThenBy {
            source: Box::new(self),
            field: OrderByField::asc(field),
        }
    }

    /// `self.ThenByDescending(field)`
    pub fn then_by_desc(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::ThenByDescending {
            source: Box::new(self),
            field: OrderByField::desc(field),
        }
    }

    /// `self.Skip(n)`
    pub fn skip(self, n: u64) -> Self {
        Self::Skip {
            source: Box::new(self),
            n,
        }
    }

    /// `self.Take(n)`
    pub fn take(self, n: u64) -> Self {
        Self::Take {
            source: Box::new(self),
            n,
        }
    }

    /// `self.method()`
    pub fn call(self, method: impl Into<SmolStr>) -> Self {
        Self::Call {
            source: Box::new(self),
            method: method.into(),
        }
    }

    /// Build `x.a.b.c` from a sequence of names.
    pub fn members<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        names.into_iter().fold(Self::Parameter, Self::member)
    }

    /// Whether this is one of the shaping wrappers that may surround an include.
    pub fn is_wrapper(&self) -> bool {
        matches!(
            self,
            Self::Where { .. }
                | Self::OrderBy { .. }
                | Self::OrderByDescending { .. }
                | Self::ThenBy { .. }
                | Self::ThenByDescending { .. }
                | Self::Skip { .. }
                | Self::Take { .. }
        )
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => f.write_str("x"),
            Self::Member { target, name } => write!(f, "{}.{}", target, name),
            Self::Cast { operand, ty } => write!(f, "(({}){})", ty, operand),
            Self::Where { source, predicate } => write!(f, "{}.Where({})", source, predicate),
            Self::OrderBy { source, field } => write!(f, "{}.OrderBy({})", source, field.column),
            Self::OrderByDescending { source, field } => {
                write!(f, "{}.OrderByDescending({})", source, field.column)
            }
            Self::ThenBy { source, field } => write!(f, "{}.ThenBy({})", source, field.column),
            Self::ThenByDescending { source, field } => {
                write!(f, "{}.ThenByDescending({})", source, field.column)
            }
            Self::Skip { source, n } => write!(f, "{}.Skip({})", source, n),
            Self::Take { source, n } => write!(f, "{}.Take({})", source, n),
            Self::Call { source, method } => write!(f, "{}.{}()", source, method),
        }
    }
}
