use nearby_api::app::create_app;
use nearby_api::config::{load_config, save_default_config};
use nearby_api::constants::{CONFIG_PATH, STATIC_DIR};
use nearby_api::logging::{init_logging, install_panic_hook};
use nearby_api::places::places_source;
use nearby_api::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--init-config") {
        match save_default_config(&CONFIG_PATH) {
            Ok(_) => {
                println!("Default configuration saved to {:?}", *CONFIG_PATH);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("Failed to save default configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging();
    install_panic_hook();

    // Load configuration
    let config = Arc::new(load_config(&CONFIG_PATH));

    let places = match places_source(config.places.clone()) {
        Ok(places) => {
            info!("Using {:?} for restaurant lookups", config.places.provider);
            places
        }
        Err(e) => {
            error!("Failed to create places client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(Arc::clone(&config), places);
    let subscription = Arc::clone(&state.subscription);
    let app = create_app(state, Some(STATIC_DIR.clone()));

    let addr: SocketAddr = match format!("{}:{}", config.server.host, config.server.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid listen address: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting Nearby Eats on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server failed: {}", e);
    }

    subscription.unsubscribe();
}
