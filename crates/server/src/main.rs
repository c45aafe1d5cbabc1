use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lotsweep_core::interaction::UserId;
use lotsweep_core::{
    create_authenticator, load_config, validate_config, Authenticator, ChatTransport,
    HidePipeline, HttpMarketplaceAccount, InMemoryConversationStore, InteractionController,
    MarketplaceAccount, TokioSleeper,
};
use lotsweep_server::api::create_router;
use lotsweep_server::dispatcher::create_dispatcher;
use lotsweep_server::state::AppState;
use lotsweep_server::telegram::TelegramTransport;

/// Buffer size for the update queue
const UPDATE_BUFFER_SIZE: usize = 100;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LOTSWEEP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!(
        "Marketplace: {} (seller {})",
        config.marketplace.base_url, config.marketplace.seller_id
    );
    if config.telegram.authorized_users.is_empty() {
        warn!("telegram.authorized_users is empty, every update will be ignored");
    }

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Marketplace session
    let account: Arc<dyn MarketplaceAccount> = Arc::new(
        HttpMarketplaceAccount::new(config.marketplace.clone())
            .context("Failed to create marketplace client")?,
    );

    // Telegram transport
    let telegram = Arc::new(
        TelegramTransport::new(&config.telegram).context("Failed to create Telegram client")?,
    );

    let pipeline = HidePipeline::new(account, Arc::new(TokioSleeper), &config.pipeline);
    let transport: Arc<dyn ChatTransport> = telegram.clone();
    let controller = Arc::new(InteractionController::new(
        pipeline,
        transport,
        Arc::new(InMemoryConversationStore::new()),
        config.telegram.authorized_users.iter().copied().map(UserId),
    ));

    // Registration failures are not fatal
    match controller.register_commands().await {
        Ok(()) => info!("Registered bot commands"),
        Err(e) => warn!("Failed to register bot commands: {}", e),
    }
    if let Some(url) = &config.telegram.webhook_url {
        match telegram
            .set_webhook(url, config.auth.secret_token.as_deref())
            .await
        {
            Ok(()) => info!("Registered webhook at {}", url),
            Err(e) => warn!("Failed to register webhook: {}", e),
        }
    }

    // Create dispatcher
    let (updates, dispatcher) = create_dispatcher(controller, UPDATE_BUFFER_SIZE);

    // Spawn dispatcher task
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), authenticator, updates));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // The router (and with it the last UpdateQueue) is dropped once serve
    // returns, which closes the channel; queued updates are still handled.
    info!("Server shutting down...");
    let _ = dispatcher_handle.await;
    info!("Dispatcher stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
