//! Main Entrypoint for the Call-simulation API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the completion-service client.
//! 3. Loading the fixed system instruction from the prompts directory.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use callsim_api::{config::Config, router::create_router, state::AppState};
use callsim_core::completion::{CompletionService, OpenRouterClient};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Loads the fixed system instruction from the prompts directory.
fn load_system_prompt(prompts_path: &Path) -> anyhow::Result<String> {
    let prompt_file = prompts_path.join("system_prompt.md");
    std::fs::read_to_string(&prompt_file)
        .with_context(|| format!("Failed to read system prompt from {}", prompt_file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let system_prompt = Arc::new(
        load_system_prompt(&config.prompts_path)
            .context("system_prompt.md not found in prompts directory")?,
    );

    let completion: Arc<dyn CompletionService> = Arc::new(
        OpenRouterClient::new(config.openrouter_api_key.clone(), config.chat_model.clone())
            .with_base_url(config.openrouter_base_url.clone())
            .with_timeout(config.completion_timeout),
    );

    let app_state = Arc::new(AppState {
        completion,
        system_prompt,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
