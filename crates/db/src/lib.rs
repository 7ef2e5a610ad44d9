//! Postgres pool factory and migration runner.

use anyhow::Context;
use shelf_kernel::{settings::DatabaseSettings, Migration};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Executor, Row};

const MIGRATIONS_TABLE: &str = "_shelf_migrations";

/// Open a connection pool against the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "shelf-db",
        max_connections = settings.max_connections,
        "connecting to postgres"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| "failed to connect to postgres")
}

/// Apply every migration not yet recorded in the migrations table.
///
/// Migrations are `(module, migration)` pairs in the order they must run; each
/// one executes in its own transaction together with its bookkeeping row.
/// Returns the number of migrations applied.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    pool.execute(
        format!(
            "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
                module     TEXT        NOT NULL,
                id         TEXT        NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (module, id)
            )"
        )
        .as_str(),
    )
    .await
    .with_context(|| "failed to create migrations table")?;

    let applied: Vec<(String, String)> =
        sqlx::query(&format!("SELECT module, id FROM {MIGRATIONS_TABLE}"))
            .fetch_all(pool)
            .await
            .with_context(|| "failed to read applied migrations")?
            .into_iter()
            .map(|row| (row.get("module"), row.get("id")))
            .collect();

    let mut count = 0;
    for (module, migration) in pending(migrations, &applied) {
        tracing::info!(target: "shelf-db", module = %module, id = migration.id, "applying migration");

        let mut tx = pool.begin().await?;
        (&mut *tx)
            .execute(migration.up)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query(&format!(
            "INSERT INTO {MIGRATIONS_TABLE} (module, id) VALUES ($1, $2)"
        ))
        .bind(module.as_str())
        .bind(migration.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        count += 1;
    }

    tracing::info!(target: "shelf-db", applied = count, "migrations complete");
    Ok(count)
}

fn pending<'a>(
    migrations: &'a [(String, Migration)],
    applied: &[(String, String)],
) -> impl Iterator<Item = &'a (String, Migration)> {
    let applied = applied.to_vec();
    migrations.iter().filter(move |(module, migration)| {
        !applied
            .iter()
            .any(|(m, id)| m == module && id == migration.id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str) -> Migration {
        Migration { id, up: "SELECT 1" }
    }

    #[test]
    fn pending_skips_applied_pairs() {
        let migrations = vec![
            ("books".to_string(), migration("001_init")),
            ("books".to_string(), migration("002_isbn_index")),
            ("users".to_string(), migration("001_init")),
        ];
        let applied = vec![("books".to_string(), "001_init".to_string())];

        let ids: Vec<(&str, &str)> = pending(&migrations, &applied)
            .map(|(module, m)| (module.as_str(), m.id))
            .collect();

        assert_eq!(ids, vec![("books", "002_isbn_index"), ("users", "001_init")]);
    }
}
