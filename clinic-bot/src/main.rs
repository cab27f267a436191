use clinic_bot::{Config, create_app};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_bot=info,dialogue_flow=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(backend = %config.backend_url, voices = %config.voices_dir.display(), "configuration loaded");
    if config.secret_key.is_none() {
        warn!("SECRET_KEY is not set, analysis categories will be unavailable");
    }

    let app = create_app(&config);
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    info!("Clinic bot running on http://{}", listener.local_addr()?);
    info!("Event endpoint: POST /events");

    axum::serve(listener, app).await?;

    Ok(())
}
