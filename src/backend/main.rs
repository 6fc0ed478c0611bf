/**
 * ActivityHub Server Entry Point
 *
 * Loads configuration (defaults, optional TOML file, environment), builds
 * the Axum app and serves it.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[STARTUP] Server initialization started");

    let config = activityhub::shared::AppConfig::load()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        auth_backend = ?config.auth.backend,
        store_backend = ?config.store.backend,
        "[STARTUP] Configuration loaded"
    );

    let app = activityhub::backend::server::init::create_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[STARTUP] Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin activityhub-server --features ssr");
    std::process::exit(1);
}
