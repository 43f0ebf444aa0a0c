//! Filter construction macros and internal helpers.
//!
//! ```rust
//! use navtree_query::filter;
//! use navtree_query::filter::Filter;
//!
//! let f = filter!(status == "open");
//! assert_eq!(f, Filter::eq("status", "open"));
//!
//! let f = filter!(closed_at is null);
//! assert_eq!(f, Filter::is_null("closed_at"));
//! ```

/// Create a column predicate.
///
/// # Syntax
///
/// - `filter!(field == value)` - Equality
/// - `filter!(field != value)` - Not equals
/// - `filter!(field > value)` - Greater than
/// - `filter!(field >= value)` - Greater than or equal
/// - `filter!(field < value)` - Less than
/// - `filter!(field <= value)` - Less than or equal
/// - `filter!(field is null)` - IS NULL
/// - `filter!(field is not null)` - IS NOT NULL
/// - `filter!(field contains value)` - substring match
/// - `filter!(field in [v1, v2, ...])` - IN list
#[macro_export]
macro_rules! filter {
    ($field:ident == $value:expr) => {
        $crate::filter::Filter::Equals(stringify!($field).to_string(), $value.into())
    };
    ($field:ident != $value:expr) => {
        $crate::filter::Filter::NotEquals(stringify!($field).to_string(), $value.into())
    };
    ($field:ident > $value:expr) => {
        $crate::filter::Filter::Gt(stringify!($field).to_string(), $value.into())
    };
    ($field:ident >= $value:expr) => {
        $crate::filter::Filter::Gte(stringify!($field).to_string(), $value.into())
    };
    ($field:ident < $value:expr) => {
        $crate::filter::Filter::Lt(stringify!($field).to_string(), $value.into())
    };
    ($field:ident <= $value:expr) => {
        $crate::filter::Filter::Lte(stringify!($field).to_string(), $value.into())
    };
    ($field:ident is null) => {
        $crate::filter::Filter::IsNull(stringify!($field).to_string())
    };
    ($field:ident is not null) => {
        $crate::filter::Filter::IsNotNull(stringify!($field).to_string())
    };
    ($field:ident contains $value:expr) => {
        $crate::filter::Filter::Contains(stringify!($field).to_string(), $value.into())
    };
    ($field:ident in [$($value:expr),* $(,)?]) => {
        $crate::filter::Filter::In(stringify!($field).to_string(), ::std::vec![$($value.into()),*])
    };
}

/// Forward the query-building surface from a continuation handle to the
/// query it wraps, so declarations can keep chaining after `then_include`
/// or `then_included`.
macro_rules! forward_to_query {
    ($handle:ident) => {
        impl<M: Model, E: QueryEngine, T, C> $handle<M, E, T, C> {
            /// The query built so far.
            pub fn query(&self) -> &Query<M, E> {
                &self.query
            }

            /// Add a root-level include. See [`Query::include`].
            pub fn include<U: Model, C2: Cardinality>(
                self,
                path: impl Into<Path<M, U, C2>>,
            ) -> Included<M, E, U, C2> {
                self.query.include(path)
            }

            /// Add a root-level dotted include. See [`Query::include_str`].
            pub fn include_str(self, path: &str) -> Query<M, E> {
                self.query.include_str(path)
            }

            /// Declare a path through the side channel. See [`Query::included_separately`].
            pub fn included_separately<U: Model, C2: Cardinality>(
                self,
                path: impl Into<Path<M, U, C2>>,
            ) -> SeparatelyIncluded<M, E, U, C2> {
                self.query.included_separately(path)
            }

            /// Filter the query. See [`Query::filter`].
            pub fn filter(self, filter: Filter) -> Query<M, E> {
                self.query.filter(filter)
            }

            /// Order the query. See [`Query::order_by`].
            pub fn order_by(self, order: impl Into<OrderBy>) -> Query<M, E> {
                self.query.order_by(order)
            }

            /// Skip rows. See [`Query::skip`].
            pub fn skip(self, n: u64) -> Query<M, E> {
                self.query.skip(n)
            }

            /// Take rows. See [`Query::take`].
            pub fn take(self, n: u64) -> Query<M, E> {
                self.query.take(n)
            }

            /// Project the query. See [`Query::select`].
            pub fn select(self, projection: Projection) -> Query<M, E> {
                self.query.select(projection)
            }

            /// The include tree. See [`Query::include_tree`].
            pub fn include_tree(&self) -> QueryResult<&IncludeTree> {
                self.query.include_tree()
            }
        }

        impl<M: Model, E: QueryEngine, T, C> IntoQuery<M, E> for $handle<M, E, T, C> {
            fn into_query(self) -> Query<M, E> {
                self.query
            }
        }

        impl<M, E, T, C> OperationGraph for $handle<M, E, T, C> {
            fn operations(&self) -> &[Operation] {
                self.query.operations()
            }

            fn separate_includes(&self) -> Option<&IncludeTree> {
                self.query.separate_includes()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::filter::{Filter, FilterValue};

    #[test]
    fn test_filter_macro() {
        assert_eq!(filter!(severity >= 3), Filter::Gte("severity".into(), FilterValue::Int(3)));
        assert_eq!(filter!(assigned_to_id is not null), Filter::is_not_null("assigned_to_id"));
        assert_eq!(
            filter!(status in ["open", "triaged"]),
            Filter::In("status".into(), vec!["open".into(), "triaged".into()])
        );
    }
}
