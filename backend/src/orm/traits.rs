//! Core traits for the entity access layer
//!
//! Storage types implement [`DatabaseEntity`]; the generic query builder and
//! CRUD orchestrator only ever talk to entities through this trait and the
//! static [`EntityDescriptor`] it exposes.

use sqlx::sqlite::SqliteRow;

use super::descriptor::EntityDescriptor;

/// Storage shape of an entity (one row of its table).
pub trait DatabaseEntity:
    for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Sync + Unpin + Sized + 'static
{
    /// Static field table for this entity
    fn descriptor() -> &'static EntityDescriptor;

    /// Primary key value
    fn id(&self) -> i64;

    /// Overwrite the primary key (used by create and replace)
    fn set_id(&mut self, id: i64);

    /// Values for every non-key column, in `descriptor().writable_fields()` order
    fn column_values(&self) -> Vec<SqlValue>;
}

/// Sort direction for ORDER BY clauses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    /// Ascending order (A-Z, 1-9, oldest-newest)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest-oldest)
    Desc,
}

impl OrderDirection {
    /// Only the `DESC` marker selects descending; any other token is ascending.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.trim().eq_ignore_ascii_case("desc") => OrderDirection::Desc,
            _ => OrderDirection::Asc,
        }
    }

    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Represents a SQL value that can be bound to a query.
///
/// Used by predicates and writes to collect values for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<chrono::NaiveDate> for SqlValue {
    fn from(value: chrono::NaiveDate) -> Self {
        SqlValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Bind a slice of [`SqlValue`]s, in order, onto any sqlx query type
/// (`Query`, `QueryAs`, `QueryScalar`).
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                $crate::orm::SqlValue::Text(s) => query.bind(s.clone()),
                $crate::orm::SqlValue::Int(i) => query.bind(*i),
                $crate::orm::SqlValue::Float(f) => query.bind(*f),
                $crate::orm::SqlValue::Bool(b) => query.bind(*b),
                $crate::orm::SqlValue::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}

pub(crate) use bind_values;
