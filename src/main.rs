//! Folio - A personal portfolio, blog and CV site

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{api, config::Config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let state = api::build_state(&config, pool)?;
    let admin = state.auth_service.admin_user().await?;
    tracing::info!(
        "Admin account: {} (two-factor {})",
        admin.email,
        if admin.has_two_factor { "on" } else { "off" }
    );

    // Rate limiter and session cleanup (every 5 minutes)
    {
        let auth = state.auth_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                auth.rate_limiter().cleanup().await;
                match auth.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!("Purged {} expired sessions", removed),
                    Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
                }
            }
        });
    }

    // Automatic backups
    {
        let backups = state.backup_service.clone();
        let every = Duration::from_secs(config.backup.check_interval_minutes.max(1) * 60);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                match backups.run_due().await {
                    Ok(Some(record)) => tracing::info!("Automatic backup created: {}", record.id),
                    Ok(None) => {}
                    Err(e) => tracing::error!("Automatic backup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
