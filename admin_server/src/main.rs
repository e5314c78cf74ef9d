//! Admin server: serves the admin menu for the models declared in `ADMIN_MODELS_PATH`.
//!
//! Run from repo root: `cargo run -p admin-server`
//! Without a database: `cargo run -p admin-server -- --memory`

use admin_sdk::{
    admin_routes, common_routes, load_from_path, resolve, AdminService, AdminSettings, AppState,
    MemoryRepository, PgRepository, Repository,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("admin_sdk=info,admin_server=info")),
        )
        .init();

    let settings = AdminSettings::from_env();
    let config = load_from_path(&settings.models_path).await?;
    let registry = resolve(&config, &settings.exclude_models)?;
    tracing::info!(
        "Loaded {} models from {}",
        registry.models().len(),
        settings.models_path.display()
    );

    let repo: Arc<dyn Repository> = if std::env::args().any(|a| a == "--memory") {
        tracing::info!("Using in-memory storage");
        Arc::new(MemoryRepository::new())
    } else {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&settings.database_url)
            .await?;
        Arc::new(PgRepository::new(pool))
    };

    let service = AdminService::new(Arc::new(registry), repo);
    let state = AppState::new(service).with_body_limit(settings.body_limit);
    let app = common_routes().merge(admin_routes(state));

    let listener = TcpListener::bind(&settings.bind).await?;
    tracing::info!("Admin server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
