mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use courier_api::auth::{AppState, AppStateInner};
use courier_api::token::TokenIssuer;

use crate::config::{ConfigEnv, parse_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "courier=debug,courier_api=debug,courier_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let config = match parse_config(ConfigEnv::from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e:#}");
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = courier_db::Database::open(&config.db_path)?;

    // Shared state; the signing key is fixed for the life of the process
    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl),
    });

    let app = courier_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!(environment = ?config.environment, "Courier server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
