//! Ordering types shared by queries and filtered includes.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// `ASC` or `DESC`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderByField {
    /// Column to sort on.
    pub column: Cow<'static, str>,
    /// Direction.
    pub order: SortOrder,
}

impl OrderByField {
    pub fn new(column: impl Into<Cow<'static, str>>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    /// `const` form for descriptor tables.
    pub const fn new_static(column: &'static str, order: SortOrder) -> Self {
        Self {
            column: Cow::Borrowed(column),
            order,
        }
    }

    /// Sort `column` ascending.
    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Sort `column` descending.
    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Desc)
    }
}

impl fmt::Display for OrderByField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.order)
    }
}

/// Ordering on one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// One column.
    Field(OrderByField),
    /// Several columns, most significant first.
    Fields(Box<[OrderByField]>),
}

impl OrderBy {
    /// No ordering at all.
    pub fn none() -> Self {
        Self::Fields(Box::new([]))
    }

    /// Whether no column is named.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Field(_) => false,
            Self::Fields(fields) => fields.is_empty(),
        }
    }

    /// Append a tie-breaker.
    pub fn then(self, field: OrderByField) -> Self {
        match self {
            Self::Field(existing) => Self::Fields(vec![existing, field].into_boxed_slice()),
            Self::Fields(existing) if existing.is_empty() => Self::Field(field),
            Self::Fields(existing) => {
                let mut fields = existing.into_vec();
                fields.push(field);
                Self::Fields(fields.into_boxed_slice())
            }
        }
    }

    /// Collect fields, collapsing a single field to [`OrderBy::Field`].
    pub fn from_fields(fields: impl IntoIterator<Item = OrderByField>) -> Self {
        let mut fields: Vec<_> = fields.into_iter().collect();
        match fields.len() {
            0 => Self::none(),
            1 => Self::Field(fields.remove(0)),
            _ => Self::Fields(fields.into_boxed_slice()),
        }
    }

    /// The fields, most significant first.
    pub fn fields(&self) -> &[OrderByField] {
        match self {
            Self::Field(field) => std::slice::from_ref(field),
            Self::Fields(fields) => fields,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<OrderByField> for OrderBy {
    fn from(field: OrderByField) -> Self {
        Self::Field(field)
    }
}

impl From<Vec<OrderByField>> for OrderBy {
    fn from(fields: Vec<OrderByField>) -> Self {
        Self::from_fields(fields)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_then_builds_multi_field_order() {
        let order = OrderBy::none()
            .then(OrderByField::asc("opened_at"))
            .then(OrderByField::desc("case_key"));
        assert_eq!(order.field_count(), 2);
        assert_eq!(order.to_string(), "opened_at ASC, case_key DESC");
    }

    #[test]
    fn test_from_fields_single() {
        let order = OrderBy::from_fields([OrderByField::new_static("id", SortOrder::Asc)]);
        assert!(matches!(order, OrderBy::Field(_)));
        assert!(OrderBy::from_fields(Vec::<OrderByField>::new()).is_empty());
    }
}
