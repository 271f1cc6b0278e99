//! Pre-seed data for initial database setup.
//!
//! Runs after schema sync to insert the default genres and cinema venues.
//! Uses INSERT OR IGNORE with fixed ids so re-runs are idempotent (existing
//! rows are preserved).

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Result of running seed operations.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub tables_seeded: Vec<String>,
    pub errors: Vec<String>,
}

async fn seed_genres(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let rows: &[(i64, &str)] = &[(1, "Action"), (2, "Comedy"), (3, "Drama"), (4, "Animation")];

    let mut inserted = 0u64;
    for (id, name) in rows {
        let result = sqlx::query("INSERT OR IGNORE INTO genres (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn seed_venues(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    // (id, name, longitude, latitude)
    let rows: &[(i64, &str, f64, f64)] = &[
        (5, "Cine Saladillo", -59.780257, -35.639151),
        (6, "Cinemark Hoyts Abasto", -58.411507, -34.603365),
        (7, "Village East Cinema", -73.986227, 40.730898),
    ];

    let mut inserted = 0u64;
    for (id, name, longitude, latitude) in rows {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO venues (id, name, longitude, latitude) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(longitude)
        .bind(latitude)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Run every seed step; failures are collected, not fatal.
pub async fn run_seeds(pool: &SqlitePool) -> SeedResult {
    let mut result = SeedResult::default();

    macro_rules! seed_one {
        ($table:literal, $step:expr) => {
            match $step.await {
                Ok(0) => debug!(table = $table, "Seed rows already present"),
                Ok(n) => {
                    info!(table = $table, rows = n, "Seeded table");
                    result.tables_seeded.push($table.to_string());
                }
                Err(e) => {
                    let msg = format!("Failed to seed {}: {}", $table, e);
                    warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        };
    }

    seed_one!("genres", seed_genres(pool));
    seed_one!("venues", seed_venues(pool));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_in_memory, sync_all_entity_schemas};
    use crate::entities;

    #[tokio::test]
    async fn test_seeds_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        sync_all_entity_schemas(&pool, &entities::registry().unwrap()).await;

        let first = run_seeds(&pool).await;
        assert!(first.errors.is_empty(), "{:?}", first.errors);
        assert_eq!(first.tables_seeded, vec!["genres", "venues"]);

        let second = run_seeds(&pool).await;
        assert!(second.tables_seeded.is_empty());

        let venues: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM venues")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(venues, 3);
    }
}
