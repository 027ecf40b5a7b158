mod assets;
mod cli;
mod gateway;
mod state;
mod tick;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use serde_json::json;
use socketioxide::SocketIo;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use game_world::World;

use cli::Args;
use state::{ServerState, SharedState};

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_server=info,game_world=info,socketioxide=warn".into()),
        )
        .init();

    let args = Args::parse();

    let loaded = assets::load(&args)?;
    info!(
        players = loaded.config.session.max_players,
        tick_rate = loaded.config.session.tick_rate,
        "assets loaded"
    );

    let world = World::new(
        loaded.config,
        loaded.terrain,
        loaded.classes,
        loaded.roles,
        loaded.harbors,
        loaded.rewards,
        args.seed,
    );

    let shared: SharedState = std::sync::Arc::new(tokio::sync::RwLock::new(ServerState::new(world)));

    let (socket_layer, io) = SocketIo::builder().build_layer();

    let io_connect = io.clone();
    let shared_connect = shared.clone();
    io_connect.ns("/", move |socket: socketioxide::extract::SocketRef| {
        let shared = shared_connect.clone();
        async move {
            gateway::register(socket, shared);
        }
    });

    let tick_handle = tokio::spawn(tick::run(shared.clone(), io.clone()));

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .layer(socket_layer)
        .layer(cors);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tick_handle.abort();
    info!("shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("ctrl_c received, shutting down");
}
