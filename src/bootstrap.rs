//! Process wiring: pick the record store, register modules, run migrations,
//! and drive the module lifecycle around the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::{
    settings::{DatabaseBackend, Settings},
    InitCtx, ModuleRegistry,
};
use sqlx::PgPool;

use crate::modules::{
    self,
    books::store::{BookStore, InMemoryBookStore, PostgresBookStore},
};

/// Registry with every application module, backed by `store`
pub fn build_registry(store: Arc<dyn BookStore>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Connect to Postgres and apply pending migrations of every module.
///
/// Returns the pool together with a registry whose modules use it.
pub async fn migrate(settings: &Settings) -> anyhow::Result<(PgPool, ModuleRegistry, usize)> {
    let pool = shelf_db::connect(&settings.database).await?;
    let registry = build_registry(Arc::new(PostgresBookStore::new(pool.clone())));

    let applied = shelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .with_context(|| "failed to run migrations")?;

    Ok((pool, registry, applied))
}

/// Run the service until a shutdown signal arrives
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "shelf-app bootstrap starting"
    );

    let registry = match settings.database.backend {
        DatabaseBackend::Memory => {
            tracing::warn!("using in-memory book store; records are lost on exit");
            build_registry(Arc::new(InMemoryBookStore::new()))
        }
        DatabaseBackend::Postgres => {
            let (_pool, registry, applied) = migrate(settings).await?;
            tracing::info!(applied, "database ready");
            registry
        }
    };

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("shelf-app bootstrap complete");

    let served = shelf_http::start_server(&registry, settings, shelf_http::shutdown_signal()).await;

    // Stop modules even when the server failed, then report the first error.
    let stopped = registry.stop_modules().await;
    served?;
    stopped
}
