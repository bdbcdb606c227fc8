//! Entrypoint for the spam-prediction web app.
//!
//! Loads the fitted pipeline artifact (fatal if the trainer has not been
//! run) and serves the form and JSON classify routes.

use anyhow::Context;
use clap::Parser;
use spamfilter::{pipeline::SpamPipeline, webapp};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spam-web", about = "Serve spam predictions from a trained model")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind_address: SocketAddr,

    /// The artifact written by `spam-train`.
    #[arg(long, default_value = "spam_model.json")]
    model_path: PathBuf,
}

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    let args = Args::parse();

    let pipeline = Arc::new(
        SpamPipeline::load(&args.model_path).context("Failed to load the model artifact")?,
    );
    info!(model_path = %args.model_path.display(), "Model artifact loaded.");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = webapp::create_router(pipeline).layer(cors);

    info!(bind_address = %args.bind_address, "Starting server...");
    let listener = tokio::net::TcpListener::bind(args.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
