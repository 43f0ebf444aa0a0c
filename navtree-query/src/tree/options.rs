//! Shaping options stripped from filtered includes.

use std::fmt;

use smol_str::SmolStr;

use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::types::{OrderBy, OrderByField};

/// Filter, ordering and paging applied to an included collection.
///
/// These never affect the shape of the include tree; the parser collects
/// them so the execution engine can apply them to the loaded collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncludeOptions {
    /// Predicate applied to the related records.
    pub filter: Option<Filter>,
    /// Ordering for the related records.
    pub order_by: Option<OrderBy>,
    /// Pagination for the related records.
    pub pagination: Option<Pagination>,
}

impl IncludeOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// AND a predicate into the filter.
    pub fn r#where(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_then(filter),
            None => filter,
        });
        self
    }

    /// Replace the ordering with a single primary key.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.order_by = Some(OrderBy::Field(field));
        self
    }

    /// Append a less significant sort key.
    pub fn then_by(mut self, field: OrderByField) -> Self {
        self.order_by = Some(self.order_by.take().unwrap_or_default().then(field));
        self
    }

    /// Skip records in the included collection.
    pub fn skip(mut self, n: u64) -> Self {
        self.pagination = Some(self.pagination.unwrap_or_default().skip(n));
        self
    }

    /// Take a limited number of records from the included collection.
    pub fn take(mut self, n: u64) -> Self {
        self.pagination = Some(self.pagination.unwrap_or_default().take(n));
        self
    }

    /// Check if no shaping was declared.
    pub fn is_empty(&self) -> bool {
        self.filter.is_none() && self.order_by.is_none() && self.pagination.is_none()
    }
}

impl fmt::Display for IncludeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(filter) = &self.filter {
            parts.push(format!("WHERE {}", filter));
        }
        if let Some(order) = &self.order_by {
            parts.push(format!("ORDER BY {}", order));
        }
        if let Some(pagination) = &self.pagination {
            parts.push(pagination.to_string());
        }
        f.write_str(&parts.join(" "))
    }
}

/// One eager-load the engine has to perform: the full path from the root
/// and the shaping for the collection at its tail.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedInclude {
    /// Navigation names from the root to the loaded collection.
    pub path: Vec<SmolStr>,
    /// Shaping for the collection at the end of `path`.
    pub options: IncludeOptions,
}

impl PlannedInclude {
    /// The path joined with `.`.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for PlannedInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())?;
        if !self.options.is_empty() {
            write!(f, " {}", self.options)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(IncludeOptions::new().is_empty());
        assert_eq!(IncludeOptions::new().to_string(), "");
    }

    #[test]
    fn test_order_by_resets_then_by_appends() {
        let options = IncludeOptions::new()
            .order_by(OrderByField::asc("title"))
            .order_by(OrderByField::asc("opened_at"))
            .then_by(OrderByField::desc("case_key"));
        assert_eq!(options.order_by.map(|o| o.to_string()).as_deref(), Some("opened_at ASC, case_key DESC"));
    }

    #[test]
    fn test_display() {
        let options = IncludeOptions::new()
            .r#where(Filter::eq("status", "open"))
            .r#where(Filter::gt("severity", 1))
            .skip(2)
            .take(5);
        assert_eq!(
            options.to_string(),
            "WHERE (status = 'open' AND severity > 1) SKIP 2 TAKE 5"
        );
    }

    #[test]
    fn test_planned_include_display() {
        let planned = PlannedInclude {
            path: vec!["CasesAssigned".into(), "CaseProducts".into()],
            options: IncludeOptions::new().take(3),
        };
        assert_eq!(planned.dotted(), "CasesAssigned.CaseProducts");
        assert_eq!(planned.to_string(), "CasesAssigned.CaseProducts TAKE 3");
    }
}
