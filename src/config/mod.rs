pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

pub use toml_config::{CorsConfig, TomlConfig};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "orders-gateway")]
#[command(about = "HTTP gateway serving ERP sales orders as JSON")]
pub struct CliConfig {
    #[arg(long, short, default_value = "gateway.toml", help = "Path to the TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Override server.bind from the configuration file")]
    pub bind: Option<String>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file and applies command-line overrides on top.
    pub fn load(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = TomlConfig::from_file(&self.config)?;
        if let Some(bind) = &self.bind {
            config.server.bind = Some(bind.clone());
        }
        if self.log_json {
            config.logging.get_or_insert_with(Default::default).format = Some("json".to_string());
        }
        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_file_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[server]
bind = "0.0.0.0:8000"

[odoo]
url = "https://erp.example.com"
db = "shop"
username = "api@example.com"
password = "secret"
"#,
            )
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "orders-gateway",
            "--config",
            &path,
            "--bind",
            "127.0.0.1:8080",
            "--log-json",
        ]);
        let config = cli.load().unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(config.json_logs());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = CliConfig::parse_from(["orders-gateway"]);
        assert_eq!(cli.config, "gateway.toml");
        assert!(cli.bind.is_none());
        assert!(!cli.verbose);
    }
}
