pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::OdooClient;
pub use config::{CorsConfig, TomlConfig};
pub use self::core::{fetcher::OrderFetcher, gateway::router};
pub use utils::error::{GatewayError, Result};
