pub mod models;
pub mod operations;

use anyhow::Result;
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

use crate::config::StoreConfig;

/// Opens the pool described by `config` and applies pending migrations.
pub async fn connect(config: &StoreConfig) -> Result<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| anyhow::anyhow!("Invalid database url {}: {}", config.database_url, e))?
        .create_if_missing(true)
        .foreign_keys(config.foreign_keys)
        .busy_timeout(config.busy_timeout);

    if config.wal {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    debug!(
        "Opening database {} ({} connections, foreign_keys={})",
        config.database_url, config.max_connections, config.foreign_keys
    );
    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    init_database(&pool).await?;
    Ok(pool)
}

/// Empties every table, children first. Migration bookkeeping is kept.
pub async fn clear_all_tables(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in [
        "exercise_sets",
        "exercise_instances",
        "workouts",
        "template_exercises",
        "workout_templates",
        "goals",
        "weight_history",
        "exercises",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_03_02_181204_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-03-02-181204-0000_setup_tables/up.sql");
const MIGRATION_2026_03_09_093511_0000_SEED_EXERCISES: &str =
    include_str!("../../../migrations/2026-03-09-093511-0000_seed_exercises/up.sql");

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "2026-03-02-181204-0000_setup_tables",
        up_sql: MIGRATION_2026_03_02_181204_0000_SETUP_TABLES,
    },
    Migration {
        name: "2026-03-09-093511-0000_seed_exercises",
        up_sql: MIGRATION_2026_03_09_093511_0000_SEED_EXERCISES,
    },
];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Applies every migration not yet recorded in `_migrations`. Each migration
/// runs in its own transaction together with its bookkeeping row.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        let mut tx = pool.begin().await?;

        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to execute migration statement in {}: {} - Error: {}",
                        migration.name,
                        statement,
                        e
                    )
                })?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}
