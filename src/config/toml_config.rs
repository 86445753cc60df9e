use crate::core::{BulkReadQuery, ConfigProvider};
use crate::domain::model::{DEFAULT_FIELDS, DEFAULT_MODEL, MAX_LIMIT};
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub odoo: OdooConfig,
    pub orders: Option<OrdersConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: Option<String>,
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersConfig {
    pub model: Option<String>,
    pub fields: Option<Vec<String>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl CorsConfig {
    pub fn allowed_origin(&self) -> &str {
        self.allowed_origin
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGIN)
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials.unwrap_or(true)
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GatewayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).map_err(toml_parse_error)?;
        let mut value = toml::Value::Table(table);
        Self::substitute_env_vars(&mut value)?;

        value.try_into().map_err(toml_parse_error)
    }

    /// 替換字串值中的環境變數 (例如 ${ODOO_PASSWORD})，未設定的保持原樣
    ///
    /// Runs on parsed values, so the substituted text is never re-read as TOML.
    fn substitute_env_vars(value: &mut toml::Value) -> Result<()> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GatewayError::ConfigError {
            message: e.to_string(),
        })?;
        Self::substitute_in(&re, value);
        Ok(())
    }

    fn substitute_in(re: &regex::Regex, value: &mut toml::Value) {
        match value {
            toml::Value::String(s) => {
                let replaced = re
                    .replace_all(s.as_str(), |caps: &regex::Captures| {
                        let var_name = &caps[1];
                        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
                    })
                    .into_owned();
                *s = replaced;
            }
            toml::Value::Array(items) => items.iter_mut().for_each(|v| Self::substitute_in(re, v)),
            toml::Value::Table(table) => table
                .iter_mut()
                .for_each(|(_, v)| Self::substitute_in(re, v)),
            _ => {}
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", self.bind_addr())?;
        validation::validate_origin(
            "server.cors.allowed_origin",
            self.server.cors.allowed_origin(),
        )?;

        validation::validate_url("odoo.url", &self.odoo.url)?;
        for (field, value) in [
            ("odoo.db", &self.odoo.db),
            ("odoo.username", &self.odoo.username),
            ("odoo.password", &self.odoo.password),
        ] {
            validation::validate_non_empty_string(field, value)?;
            validation::validate_resolved(field, value)?;
        }
        if let Some(timeout) = self.odoo.timeout_seconds {
            validation::validate_positive_number("odoo.timeout_seconds", timeout as usize, 1)?;
        }

        let query = self.bulk_read_query();
        validation::validate_non_empty_string("orders.model", &query.model)?;
        if query.fields.is_empty() {
            return Err(GatewayError::InvalidConfigValueError {
                field: "orders.fields".to_string(),
                value: "[]".to_string(),
                reason: "At least one field is required".to_string(),
            });
        }
        validation::validate_range("orders.limit", query.limit, 1, MAX_LIMIT)?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if !["compact", "json"].contains(&format) {
                return Err(GatewayError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Supported formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn cors(&self) -> &CorsConfig {
        &self.server.cors
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }

    /// 取得 search_read 查詢設定，未指定的部分使用預設值
    pub fn bulk_read_query(&self) -> BulkReadQuery {
        let orders = self.orders.clone().unwrap_or_default();
        BulkReadQuery {
            model: orders.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fields: orders
                .fields
                .unwrap_or_else(|| DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()),
            limit: orders.limit.unwrap_or(MAX_LIMIT),
        }
    }
}

fn toml_parse_error(e: toml::de::Error) -> GatewayError {
    GatewayError::ConfigValidationError {
        field: "toml_parsing".to_string(),
        message: format!("TOML parsing error: {}", e),
    }
}

impl ConfigProvider for TomlConfig {
    fn erp_url(&self) -> &str {
        &self.odoo.url
    }

    fn database(&self) -> &str {
        &self.odoo.db
    }

    fn username(&self) -> &str {
        &self.odoo.username
    }

    fn password(&self) -> &str {
        &self.odoo.password
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.odoo.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
