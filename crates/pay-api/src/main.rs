//! # Item Checkout
//!
//! Single-item checkout page backed by Stripe hosted checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//!
//! # Build the browser bundle, then run the server
//! wasm-pack build crates/pay-wasm --target web
//! item-checkout
//! ```

use pay_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let addr = config.socket_addr()?;
    let state = AppState::new(config)?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Selling: {} at {}",
        state.item.name,
        state.item.unit_price().display()
    );
    info!("Payment provider: {}", state.strategy.provider_name());

    let app = routes::create_router(state);

    info!("Item checkout listening on http://{}", addr);
    if !is_prod {
        info!("Page: http://{}/", addr);
        info!("Checkout: POST http://{}{}", addr, routes::CREATE_SESSION_PATH);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
