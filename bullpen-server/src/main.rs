use bullpen_server::{api, config, db, state::AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bullpen_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new().expect("Failed to load settings");

    let db = db::Database::with_pool_size(&settings.database.path, settings.database.pool_size)
        .expect("Failed to create database");
    db.initialize()
        .expect("Failed to initialize database schema");

    if settings.database.seed_demo_data {
        db.seed_demo_data().expect("Failed to seed demo data");
        tracing::info!("Demo data seeded");
    }
    tracing::info!(path = %settings.database.path, "Database initialized successfully");

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");

    let state = AppState::new(db, settings);
    let app = api::router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
