//! Automatic schema synchronization from entity descriptors
//!
//! - Creates missing tables
//! - Adds missing columns
//! - Does NOT handle column renames or type changes (requires DB wipe)

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::orm::{EntityDescriptor, EntityRegistry, FieldDef};

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub columns_added: Vec<(String, String)>, // (table, column)
    pub errors: Vec<String>,
}

impl SchemaSyncResult {
    fn merge(&mut self, other: SchemaSyncResult) {
        self.tables_created.extend(other.tables_created);
        self.columns_added.extend(other.columns_added);
        self.errors.extend(other.errors);
    }
}

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Get existing columns for a table
async fn get_table_columns(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(i32, String, String, i32, Option<String>, i32)> =
        sqlx::query_as(&format!("PRAGMA table_info({})", table_name))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(_, name, _, _, _, _)| name).collect())
}

/// Sync a single entity's table to the database
pub async fn sync_entity(
    pool: &SqlitePool,
    descriptor: &EntityDescriptor,
) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();
    let table_name = descriptor.table;

    if !table_exists(pool, table_name).await? {
        let create_sql = descriptor.create_table_sql();
        debug!("Creating table {}: {}", table_name, create_sql);

        match sqlx::query(&create_sql).execute(pool).await {
            Ok(_) => {
                info!("Created table: {}", table_name);
                result.tables_created.push(table_name.to_string());
            }
            Err(e) => {
                let msg = format!("Failed to create table {}: {}", table_name, e);
                warn!("{}", msg);
                result.errors.push(msg);
            }
        }
    } else {
        let existing_columns = get_table_columns(pool, table_name).await?;

        for field in descriptor.fields {
            if existing_columns.iter().any(|c| c.eq_ignore_ascii_case(field.column)) {
                continue;
            }

            let alter_sql = generate_add_column_sql(table_name, field);
            debug!("Adding column to {}: {}", table_name, alter_sql);

            match sqlx::query(&alter_sql).execute(pool).await {
                Ok(_) => {
                    info!("Added column {}.{}", table_name, field.column);
                    result
                        .columns_added
                        .push((table_name.to_string(), field.column.to_string()));
                }
                Err(e) => {
                    let msg = format!("Failed to add column {}.{}: {}", table_name, field.column, e);
                    warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        }
    }

    Ok(result)
}

/// Generate ALTER TABLE ADD COLUMN SQL
fn generate_add_column_sql(table_name: &str, field: &FieldDef) -> String {
    let sql_type = field.kind.sql_type();
    let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table_name, field.column, sql_type);

    // SQLite cannot add a NOT NULL column without a default
    if !field.nullable {
        let default_val = match sql_type {
            "INTEGER" => "0",
            "REAL" => "0.0",
            _ => "''",
        };
        sql.push_str(&format!(" NOT NULL DEFAULT {}", default_val));
    }

    sql
}

/// Sync every registered table, in registration order.
pub async fn sync_all_entity_schemas(pool: &SqlitePool, registry: &EntityRegistry) -> SchemaSyncResult {
    let mut total_result = SchemaSyncResult::default();

    for descriptor in registry.iter() {
        match sync_entity(pool, descriptor).await {
            Ok(result) => total_result.merge(result),
            Err(e) => total_result
                .errors
                .push(format!("Error syncing {}: {}", descriptor.name, e)),
        }
    }

    total_result
}
