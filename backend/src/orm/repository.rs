//! Generic CRUD orchestration
//!
//! [`Crud`] drives list / get / create / replace / patch / delete for any
//! entity that implements [`EntityShapes`]. Handlers construct one per
//! request from the shared pool and mapper:
//!
//! ```rust,ignore
//! let movies = Crud::<Movie>::new(&state.pool, &state.mapper);
//! let page = movies
//!     .list_filtered(Predicate::All, &filter, sort.as_ref(), range.as_ref(), &mut headers)
//!     .await?;
//! ```

use std::marker::PhantomData;

use sqlx::SqlitePool;
use tracing::debug;

use super::builder::{EntityQuery, execute_with_binds};
use super::mapper::{EntityShapes, Mapper, Patchable};
use super::pagination::{MetadataSink, emit_content_range, emit_total_pages};
use super::params::{FilterDescriptor, PageDescriptor, RangeDescriptor, SortDescriptor};
use super::patch::PatchDocument;
use super::predicate::{Predicate, build_predicate};
use super::traits::{DatabaseEntity, SqlValue};
use super::validation::{Validate, ValidationErrors};
use crate::error::{CatalogError, CatalogResult};

/// Uniform data access for one entity type.
pub struct Crud<'a, E> {
    pool: &'a SqlitePool,
    mapper: &'a Mapper,
    _marker: PhantomData<E>,
}

impl<'a, E: EntityShapes> Crud<'a, E> {
    pub fn new(pool: &'a SqlitePool, mapper: &'a Mapper) -> Self {
        Self {
            pool,
            mapper,
            _marker: PhantomData,
        }
    }

    fn to_read(&self, rows: Vec<E>) -> Vec<E::Read> {
        rows.iter().map(|row| row.to_read(self.mapper)).collect()
    }

    /// Every row, primary-key order.
    pub async fn list_all(&self) -> CatalogResult<Vec<E::Read>> {
        let rows = EntityQuery::<E>::new().default_order().fetch_all(self.pool).await?;
        Ok(self.to_read(rows))
    }

    /// Filter, count, sort, slice, then report the range through `sink`.
    ///
    /// `base` is AND-ed with whatever the filter descriptor yields.
    pub async fn list_filtered(
        &self,
        base: Predicate,
        filter: &FilterDescriptor,
        sort: Option<&SortDescriptor>,
        range: Option<&RangeDescriptor>,
        sink: &mut impl MetadataSink,
    ) -> CatalogResult<Vec<E::Read>> {
        let descriptor = E::descriptor();
        let query = EntityQuery::<E>::new().filter(base.and(build_predicate(descriptor, filter)));

        let total = query.count(self.pool).await?;
        let rows = query
            .sort(sort)
            .default_order()
            .range(range)
            .fetch_all(self.pool)
            .await?;

        emit_content_range(sink, descriptor.name, range, total);
        Ok(self.to_read(rows))
    }

    /// One page of `base`, reporting `totalPages` through `sink`.
    pub async fn list_paged(
        &self,
        base: Predicate,
        page: &PageDescriptor,
        sink: &mut impl MetadataSink,
    ) -> CatalogResult<Vec<E::Read>> {
        let query = EntityQuery::<E>::new().filter(base);

        let total = query.count(self.pool).await?;
        emit_total_pages(sink, total, page.records_per_page());

        let rows = query.default_order().page(page).fetch_all(self.pool).await?;
        Ok(self.to_read(rows))
    }

    /// Storage row by primary key
    pub async fn find(&self, id: i64) -> CatalogResult<Option<E>> {
        let descriptor = E::descriptor();
        let by_id = Predicate::eq(descriptor, descriptor.primary_key, id)
            .ok_or_else(|| missing_primary_key(descriptor.name))?;
        Ok(EntityQuery::<E>::new().filter(by_id).fetch_optional(self.pool).await?)
    }

    pub async fn exists(&self, id: i64) -> CatalogResult<bool> {
        let descriptor = E::descriptor();
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
            descriptor.table, descriptor.primary_key
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(self.pool).await?;
        Ok(exists)
    }

    pub async fn get(&self, id: i64) -> CatalogResult<E::Read> {
        self.find(id)
            .await?
            .map(|row| row.to_read(self.mapper))
            .ok_or(CatalogError::NotFound)
    }

    /// Validate, map and insert; returns the new id and its read shape.
    pub async fn create(&self, input: E::Create) -> CatalogResult<(i64, E::Read)> {
        input.validate()?;
        let row = self.insert(E::from_create(input, self.mapper)).await?;
        Ok((row.id(), row.to_read(self.mapper)))
    }

    /// Insert a prepared storage row and assign its generated id.
    pub async fn insert(&self, mut row: E) -> CatalogResult<E> {
        let (sql, values) = insert_statement(&row);
        let result = execute_with_binds(&sql, &values, self.pool).await?;
        row.set_id(result.last_insert_rowid());
        debug!(entity = E::descriptor().name, id = row.id(), "Inserted row");
        Ok(row)
    }

    /// Overwrite every column of an existing row.
    pub async fn replace(&self, id: i64, input: E::Create) -> CatalogResult<()> {
        input.validate()?;
        let mut row = E::from_create(input, self.mapper);
        row.set_id(id);
        self.update(&row).await
    }

    /// Write a storage row back; `NotFound` if its id does not exist.
    pub async fn update(&self, row: &E) -> CatalogResult<()> {
        let (sql, values) = update_statement(row);
        let result = execute_with_binds(&sql, &values, self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let descriptor = E::descriptor();
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            descriptor.table, descriptor.primary_key
        );
        let result = execute_with_binds(&sql, &[SqlValue::Int(id)], self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        debug!(entity = descriptor.name, id, "Deleted row");
        Ok(())
    }
}

impl<E: Patchable> Crud<'_, E> {
    /// Apply a JSON Patch to the row's patch shape inside one transaction.
    ///
    /// Any patch, deserialization or validation failure rolls back and
    /// surfaces as `Validation`; nothing is written.
    pub async fn patch(&self, id: i64, document: &PatchDocument) -> CatalogResult<()> {
        let descriptor = E::descriptor();
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE {} = ?", descriptor.select_sql(), descriptor.primary_key);
        let mut row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CatalogError::NotFound)?;

        let mut shape = serde_json::to_value(row.to_patch(self.mapper))
            .map_err(|e| ValidationErrors::single("patch", e.to_string()))?;
        document.apply(&mut shape)?;

        let patched: E::Patch = serde_json::from_value(shape)
            .map_err(|e| ValidationErrors::single("patch", e.to_string()))?;
        patched.validate()?;

        row.merge_patch(patched, self.mapper);
        let (sql, values) = update_statement(&row);
        execute_with_binds(&sql, &values, &mut *tx).await?;

        tx.commit().await?;
        debug!(entity = descriptor.name, id, operations = document.0.len(), "Patched row");
        Ok(())
    }
}

fn missing_primary_key(entity: &str) -> CatalogError {
    CatalogError::bad_request(format!("entity '{entity}' has no addressable primary key"))
}

fn insert_statement<E: DatabaseEntity>(row: &E) -> (String, Vec<SqlValue>) {
    let descriptor = E::descriptor();
    let columns: Vec<&str> = descriptor.writable_fields().map(|f| f.column).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        descriptor.table,
        columns.join(", "),
        placeholders
    );
    (sql, row.column_values())
}

fn update_statement<E: DatabaseEntity>(row: &E) -> (String, Vec<SqlValue>) {
    let descriptor = E::descriptor();
    let assignments: Vec<String> = descriptor
        .writable_fields()
        .map(|f| format!("{} = ?", f.column))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        descriptor.table,
        assignments.join(", "),
        descriptor.primary_key
    );
    let mut values = row.column_values();
    values.push(SqlValue::Int(row.id()));
    (sql, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::entities::{self, Actor, ActorCreate, Genre, GenreCreate};
    use crate::orm::ResponseMetadata;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    async fn pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        let registry = entities::registry().unwrap();
        db::prepare(&pool, &registry, false).await.unwrap();
        pool
    }

    fn actor(name: &str) -> ActorCreate {
        ActorCreate {
            name: name.to_string(),
            biography: None,
            birth_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn test_list_filtered_reports_unsliced_total() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Actor>::new(&pool, &mapper);
        for name in ["Ana", "Bruno", "Anabel", "Carla"] {
            crud.create(actor(name)).await.unwrap();
        }

        let filter = FilterDescriptor::parse(Some(r#"{"name":"ana"}"#));
        let range = RangeDescriptor::new(1, 5);
        let mut metadata = ResponseMetadata::new();
        let rows = crud
            .list_filtered(Predicate::All, &filter, None, Some(&range), &mut metadata)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Anabel");
        assert_eq!(metadata.get("Content-Range"), Some("actor 1-5/2"));
    }

    #[tokio::test]
    async fn test_substring_filter_folds_ascii_case_only() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Actor>::new(&pool, &mapper);
        crud.create(actor("Ñandú")).await.unwrap();

        let mut metadata = ResponseMetadata::new();
        let ascii = FilterDescriptor::parse(Some(r#"{"name":"ÑAND"}"#));
        let rows = crud
            .list_filtered(Predicate::All, &ascii, None, None, &mut metadata)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let non_ascii = FilterDescriptor::parse(Some(r#"{"name":"ñ"}"#));
        let rows = crud
            .list_filtered(Predicate::All, &non_ascii, None, None, &mut metadata)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_inverted_range_yields_nothing() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Actor>::new(&pool, &mapper);
        crud.create(actor("Ana")).await.unwrap();

        let mut metadata = ResponseMetadata::new();
        let rows = crud
            .list_filtered(
                Predicate::All,
                &FilterDescriptor::default(),
                None,
                Some(&RangeDescriptor::new(3, 1)),
                &mut metadata,
            )
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(metadata.get("content-range"), Some("actor 3-1/1"));
    }

    #[tokio::test]
    async fn test_list_paged_reports_total_pages() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Genre>::new(&pool, &mapper);
        for name in ["A", "B", "C", "D", "E"] {
            crud.create(GenreCreate { name: name.into() }).await.unwrap();
        }

        let page = PageDescriptor::new(3, 2, 50).unwrap();
        let mut metadata = ResponseMetadata::new();
        let rows = crud.list_paged(Predicate::All, &page, &mut metadata).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "E");
        assert_eq!(metadata.get("totalPages"), Some("3"));
    }

    #[tokio::test]
    async fn test_create_validates_before_writing() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Genre>::new(&pool, &mapper);

        let err = crud.create(GenreCreate { name: String::new() }).await.unwrap_err();
        assert_matches!(err, CatalogError::Validation(_));
        assert!(crud.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Genre>::new(&pool, &mapper);

        assert!(!crud.exists(9).await.unwrap());
        assert_matches!(crud.get(9).await, Err(CatalogError::NotFound));
        assert_matches!(crud.delete(9).await, Err(CatalogError::NotFound));
        assert_matches!(
            crud.replace(9, GenreCreate { name: "X".into() }).await,
            Err(CatalogError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_patch_is_all_or_nothing() {
        let pool = pool().await;
        let mapper = Mapper::default();
        let crud = Crud::<Actor>::new(&pool, &mapper);
        let (id, _) = crud.create(actor("Ana")).await.unwrap();

        let document: PatchDocument = serde_json::from_value(serde_json::json!([
            {"op": "replace", "path": "/name", "value": "Changed"},
            {"op": "remove", "path": "/missing"},
        ]))
        .unwrap();
        assert_matches!(crud.patch(id, &document).await, Err(CatalogError::Validation(_)));
        assert_eq!(crud.get(id).await.unwrap().name, "Ana");
    }
}
