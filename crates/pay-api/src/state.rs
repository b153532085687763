//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the checkout strategy, the item on sale, page templates and
//! configuration.

use crate::page::PageRenderer;
use pay_core::{BoxedCheckoutStrategy, CheckoutUrls, Item};
use pay_stripe::StripeCheckoutStrategy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the page, used for Stripe return URLs
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding the wasm-pack output served under `/pkg`
    pub static_dir: PathBuf,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("crates/pay-wasm/pkg")),
            log_json: std::env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Creates hosted checkout sessions
    pub strategy: BoxedCheckoutStrategy,
    /// The item the page sells, at quantity 0
    pub item: Item,
    /// Stripe return URLs
    pub urls: CheckoutUrls,
    /// Publishable key handed to the browser
    pub publishable_key: String,
    /// Page templates
    pub pages: Arc<PageRenderer>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by Stripe
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let publishable_key = stripe.config().publishable_key.clone();

        let item = load_item()?;

        Self::with_strategy(config, Arc::new(stripe), publishable_key, item)
    }

    /// Create state around an explicit strategy
    pub fn with_strategy(
        config: AppConfig,
        strategy: BoxedCheckoutStrategy,
        publishable_key: impl Into<String>,
        item: Item,
    ) -> anyhow::Result<Self> {
        let pages = PageRenderer::new().map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(Self {
            strategy,
            item: Item {
                quantity: 0,
                ..item
            },
            urls: CheckoutUrls::new(&config.base_url),
            publishable_key: publishable_key.into(),
            pages: Arc::new(pages),
            config,
        })
    }

    /// Get success URL handed to the provider
    pub fn success_url(&self) -> String {
        self.urls.success_url()
    }

    /// Get cancel URL handed to the provider
    pub fn cancel_url(&self) -> String {
        self.urls.cancel_url()
    }
}

/// Load the item from `config/item.toml`, falling back to the demo item
fn load_item() -> anyhow::Result<Item> {
    let config_paths = [
        "config/item.toml",
        "../config/item.toml",
        "../../config/item.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let item = Item::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded item '{}' from {}", item.name, path);
            return Ok(item);
        }
    }

    tracing::info!("No item config found, using demo item");
    Ok(Item::demo())
}
