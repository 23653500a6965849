pub mod api;
pub mod apperrors;
pub mod config;
pub mod context;
pub mod logic;
pub mod model;
pub mod store;
pub mod tenant;

use std::sync::Arc;

use anyhow::Context;

pub use api::graphql::{build_schema, DirectorSchema};
pub use api::routes::create_router;
pub use config::AppConfig;
pub use store::PostgresStore;

/// Connects to PostgreSQL, applies migrations unless skipped, and serves the API until the
/// listener fails.
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let store = PostgresStore::new(&config.database_url(), config.database.max_connections).await?;
    if config.skip_migrations {
        log::info!("skipping database migrations");
    } else {
        log::info!("running database migrations");
        store.migrate().await?;
    }

    let services = logic::Services::new(
        &store::Repositories::postgres(),
        Arc::new(logic::UuidService),
        logic::utc_now_generator(),
    );
    let schema = build_schema(services, Arc::new(store.transactioner()));
    let app = create_router(schema, &config.api_endpoint, &config.playground_api_endpoint);

    let listener = TcpListener::bind(&config.address)
        .await
        .with_context(|| format!("while binding to {}", config.address))?;
    log::info!("director listening on http://{}{}", config.address, config.api_endpoint);
    if config.playground_api_endpoint != config.api_endpoint {
        log::info!("playground available at http://{}{}", config.address, config.playground_api_endpoint);
    }

    serve(listener, app).await?;
    Ok(())
}
