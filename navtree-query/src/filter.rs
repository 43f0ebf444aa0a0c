//! Predicates used by query-level and include-level filtering.
//!
//! A [`Filter`] is plain data: it names columns, never navigations, so a
//! predicate wrapped around a collection include can never be mistaken for
//! part of the include path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A filter value that can be used in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::List(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A predicate over the columns of one entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No filter (always true).
    #[default]
    None,

    /// Equals comparison.
    Equals(String, FilterValue),
    /// Not equals comparison.
    NotEquals(String, FilterValue),

    /// Less than comparison.
    Lt(String, FilterValue),
    /// Less than or equal comparison.
    Lte(String, FilterValue),
    /// Greater than comparison.
    Gt(String, FilterValue),
    /// Greater than or equal comparison.
    Gte(String, FilterValue),

    /// In a list of values.
    In(String, Vec<FilterValue>),

    /// Contains (for strings).
    Contains(String, FilterValue),

    /// Is null check.
    IsNull(String),
    /// Is not null check.
    IsNotNull(String),

    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn none() -> Self {
        Self::None
    }

    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    /// `column != value`.
    pub fn ne(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::NotEquals(column.into(), value.into())
    }

    /// `column > value`.
    pub fn gt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Gt(column.into(), value.into())
    }

    /// `column < value`.
    pub fn lt(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Lt(column.into(), value.into())
    }

    /// `column IS NULL`.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    /// `column IS NOT NULL`.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    /// Create an AND filter.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::Or(filters),
        }
    }

    /// Create a NOT filter.
    pub fn not(filter: Filter) -> Self {
        if filter.is_none() {
            return Self::None;
        }
        Self::Not(Box::new(filter))
    }

    /// Combine with another filter using AND.
    pub fn and_then(self, other: Filter) -> Self {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return self;
        }
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            _ => Self::And(vec![self, other]),
        }
    }

    /// Every column this predicate reads, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        let column = match self {
            Self::None => return,
            Self::Equals(c, _)
            | Self::NotEquals(c, _)
            | Self::Lt(c, _)
            | Self::Lte(c, _)
            | Self::Gt(c, _)
            | Self::Gte(c, _)
            | Self::In(c, _)
            | Self::Contains(c, _)
            | Self::IsNull(c)
            | Self::IsNotNull(c) => c.as_str(),
            Self::And(filters) | Self::Or(filters) => {
                for f in filters {
                    f.collect_columns(out);
                }
                return;
            }
            Self::Not(inner) => return inner.collect_columns(out),
        };
        if !out.contains(&column) {
            out.push(column);
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, filters: &[Filter], op: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, filter) in filters.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{}", filter)?;
            }
            f.write_str(")")
        }

        match self {
            Self::None => f.write_str("TRUE"),
            Self::Equals(c, v) if v.is_null() => write!(f, "{} IS NULL", c),
            Self::Equals(c, v) => write!(f, "{} = {}", c, v),
            Self::NotEquals(c, v) if v.is_null() => write!(f, "{} IS NOT NULL", c),
            Self::NotEquals(c, v) => write!(f, "{} != {}", c, v),
            Self::Lt(c, v) => write!(f, "{} < {}", c, v),
            Self::Lte(c, v) => write!(f, "{} <= {}", c, v),
            Self::Gt(c, v) => write!(f, "{} > {}", c, v),
            Self::Gte(c, v) => write!(f, "{} >= {}", c, v),
            Self::In(c, values) => write!(f, "{} IN {}", c, FilterValue::List(values.clone())),
            Self::Contains(c, v) => write!(f, "{} CONTAINS {}", c, v),
            Self::IsNull(c) => write!(f, "{} IS NULL", c),
            Self::IsNotNull(c) => write!(f, "{} IS NOT NULL", c),
            Self::And(filters) => join(f, filters, "AND"),
            Self::Or(filters) => join(f, filters, "OR"),
            Self::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from(42i32), FilterValue::Int(42));
        assert_eq!(FilterValue::from("hello"), FilterValue::String("hello".to_string()));
        assert_eq!(FilterValue::from(true), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
    }

    #[test]
    fn test_and_skips_empty_filters() {
        let combined = Filter::and([Filter::none(), Filter::is_not_null("description")]);
        assert_eq!(combined, Filter::is_not_null("description"));
        assert!(Filter::and([Filter::none()]).is_none());
    }

    #[test]
    fn test_and_then_flattens() {
        let filter = Filter::eq("status", "open")
            .and_then(Filter::gt("severity", 2))
            .and_then(Filter::is_null("closed_at"));
        match filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_columns_are_deduplicated() {
        let filter = Filter::or([
            Filter::eq("status", "open"),
            Filter::not(Filter::eq("status", "closed")),
            Filter::is_not_null("assigned_to_id"),
        ]);
        assert_eq!(filter.columns(), vec!["status", "assigned_to_id"]);
    }

    #[test]
    fn test_display() {
        let filter = Filter::and([Filter::eq("title", "it's"), Filter::In("id".into(), vec![1.into(), 2.into()])]);
        assert_eq!(filter.to_string(), "(title = 'it''s' AND id IN (1, 2))");
        assert_eq!(Filter::eq("closed_at", FilterValue::Null).to_string(), "closed_at IS NULL");
    }
}
