//! SQL query builder for entity lists
//!
//! Builds parameterized SELECT and COUNT statements for a `DatabaseEntity`
//! from a [`Predicate`], an optional sort and an optional row window. Values
//! are always bound positionally; only identifiers from the static
//! descriptors are spliced into the SQL text.

use std::marker::PhantomData;

use sqlx::SqlitePool;
use tracing::debug;

use super::descriptor::{EntityDescriptor, FieldPath, resolve_path};
use super::params::{PageDescriptor, RangeDescriptor, SortDescriptor};
use super::predicate::{Predicate, SqlFragment};
use super::traits::{DatabaseEntity, OrderDirection, bind_values};

/// A query builder for database entities.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: PhantomData<E>,
    predicate: Predicate,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<E: DatabaseEntity> EntityQuery<E> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
            predicate: Predicate::All,
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// AND another predicate into the WHERE clause.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = std::mem::replace(&mut self.predicate, Predicate::All).and(predicate);
        self
    }

    /// Apply a sort descriptor; an unresolvable path leaves the query unsorted.
    pub fn sort(mut self, sort: Option<&SortDescriptor>) -> Self {
        let Some(sort) = sort else {
            return self;
        };

        match resolve_path(E::descriptor(), &sort.path) {
            Some(path) => {
                self.order_by = Some(format!(
                    "{} {}",
                    order_expression(E::descriptor(), &path),
                    sort.direction.to_sql()
                ));
            }
            None => {
                debug!(entity = E::descriptor().name, path = %sort.path, "Ignoring sort on unknown path");
            }
        }
        self
    }

    /// Primary-key order when nothing else was requested.
    pub fn default_order(mut self) -> Self {
        if self.order_by.is_none() {
            let descriptor = E::descriptor();
            self.order_by = Some(format!(
                "{}.{} {}",
                descriptor.table,
                descriptor.primary_key,
                OrderDirection::Asc.to_sql()
            ));
        }
        self
    }

    /// Skip `max(start, 0)` rows and take `end - start + 1`.
    pub fn range(mut self, range: Option<&RangeDescriptor>) -> Self {
        if let Some(range) = range {
            self.offset = Some(range.offset());
            self.limit = Some(range.limit());
        }
        self
    }

    pub fn page(mut self, page: &PageDescriptor) -> Self {
        self.offset = Some(page.offset());
        self.limit = Some(page.limit());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn where_fragment(&self) -> SqlFragment {
        match self.predicate.to_sql() {
            Some(fragment) => SqlFragment {
                sql: format!(" WHERE {}", fragment.sql),
                values: fragment.values,
            },
            None => SqlFragment::default(),
        }
    }

    /// Build the SELECT statement and its bind values.
    pub fn build_sql(&self) -> SqlFragment {
        let SqlFragment { sql: where_sql, values } = self.where_fragment();
        let mut sql = E::descriptor().select_sql();
        sql.push_str(&where_sql);

        if let Some(ref order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {}", limit.max(0)));
                if let Some(offset) = offset
                    && offset > 0
                {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            (None, Some(offset)) if offset > 0 => {
                sql.push_str(&format!(" LIMIT -1 OFFSET {offset}"));
            }
            _ => {}
        }

        SqlFragment { sql, values }
    }

    /// Build a COUNT statement over the filtered, unsliced rows.
    pub fn build_count_sql(&self) -> SqlFragment {
        let SqlFragment { sql: where_sql, values } = self.where_fragment();
        SqlFragment {
            sql: format!("SELECT COUNT(*) FROM {}{}", E::descriptor().table, where_sql),
            values,
        }
    }

    /// Execute the query and return all matching entities.
    pub async fn fetch_all(self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        if self.limit == Some(0) {
            return Ok(Vec::new());
        }

        let SqlFragment { sql, values } = self.build_sql();
        debug!(sql = %sql, "Executing entity query");

        bind_values!(sqlx::query_as::<_, E>(&sql), &values)
            .fetch_all(pool)
            .await
    }

    /// Execute the query and return the first entity, if any.
    pub async fn fetch_optional(self, pool: &SqlitePool) -> Result<Option<E>, sqlx::Error> {
        let SqlFragment { sql, values } = self.limit(1).build_sql();
        debug!(sql = %sql, "Executing entity query (one)");

        bind_values!(sqlx::query_as::<_, E>(&sql), &values)
            .fetch_optional(pool)
            .await
    }

    /// Execute a COUNT query.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let SqlFragment { sql, values } = self.build_count_sql();
        debug!(sql = %sql, "Executing count query");

        bind_values!(sqlx::query_scalar::<_, i64>(&sql), &values)
            .fetch_one(pool)
            .await
    }
}

impl<E: DatabaseEntity> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// ORDER BY expression for a resolved path.
///
/// Dotted paths become correlated sub-selects, aliased `j0`, `j1`, … so a
/// self-referencing hop does not shadow the outer table.
pub fn order_expression(root: &EntityDescriptor, path: &FieldPath) -> String {
    if path.hops.is_empty() {
        return format!("{}.{}", root.table, path.field.column);
    }

    let last = path.hops.len() - 1;
    let mut expr = format!("j{last}.{}", path.field.column);
    for (i, hop) in path.hops.iter().enumerate().rev() {
        let parent = if i == 0 {
            root.table.to_string()
        } else {
            format!("j{}", i - 1)
        };
        expr = format!(
            "(SELECT {expr} FROM {table} AS j{i} WHERE j{i}.{pk} = {parent}.{fk})",
            table = hop.target.table,
            pk = hop.target.primary_key,
            fk = hop.column,
        );
    }
    expr
}

/// Execute an INSERT/UPDATE/DELETE with bound values.
pub async fn execute_with_binds<'e, X>(
    sql: &str,
    values: &[super::traits::SqlValue],
    executor: X,
) -> Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>
where
    X: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    debug!(sql = %sql, "Executing statement");
    bind_values!(sqlx::query(sql), values).execute(executor).await
}
