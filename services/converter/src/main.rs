use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::database::health_check;
use converter::{
    AppState,
    config::Settings,
    create_router,
    currency::CurrencyClient,
    database::bootstrap,
    jwt::JwtService,
    repositories::UserRepository,
    routes::pages::load_templates,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine, the process environment still applies
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    info!("Starting converter service");

    let settings = Settings::load().context("failed to load settings")?;

    // Initialize database
    let database = bootstrap(&settings.database()).await?;

    match health_check(&database).await {
        Ok(_) => info!("Database connection successful"),
        Err(e) => warn!("Database is not reachable yet: {}", e),
    }

    let jwt_service = JwtService::new(settings.jwt())?;
    let currency_client = CurrencyClient::new(settings.currency_api())?;
    let templates = load_templates(&settings.templates)?;
    let users = Arc::new(UserRepository::new(database));

    let app_state = AppState::new(users, jwt_service, currency_client, templates);

    // Start the web server
    let app = create_router(app_state, &settings.cors_origins);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("Converter service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
