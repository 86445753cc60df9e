use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Stable, machine-readable error codes returned in the JSON error body.
pub mod error_code {
    pub const TRANSPORT: &str = "TRANSPORT";
    pub const RPC_STATUS: &str = "RPC_STATUS";
    pub const RPC_FAULT: &str = "RPC_FAULT";
    pub const AUTHENTICATION_FAILED: &str = "AUTHENTICATION_FAILED";
    pub const XML_PARSE: &str = "XML_PARSE";
    pub const UNEXPECTED_RESPONSE: &str = "UNEXPECTED_RESPONSE";
    pub const CONFIG: &str = "CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("RPC endpoint returned HTTP {status}")]
    RpcStatus { status: u16 },

    #[error("RPC fault {code}: {message}")]
    RpcFault { code: i64, message: String },

    #[error("Authentication failed for user '{username}' on database '{db}'")]
    AuthenticationFailed { db: String, username: String },

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("Unexpected RPC response: {message}")]
    UnexpectedResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<quick_xml::Error> for GatewayError {
    fn from(err: quick_xml::Error) -> Self {
        GatewayError::XmlParse {
            message: err.to_string(),
        }
    }
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::ApiError(_) => error_code::TRANSPORT,
            GatewayError::RpcStatus { .. } => error_code::RPC_STATUS,
            GatewayError::RpcFault { .. } => error_code::RPC_FAULT,
            GatewayError::AuthenticationFailed { .. } => error_code::AUTHENTICATION_FAILED,
            GatewayError::XmlParse { .. } => error_code::XML_PARSE,
            GatewayError::UnexpectedResponse { .. } => error_code::UNEXPECTED_RESPONSE,
            GatewayError::IoError(_) | GatewayError::SerializationError(_) => error_code::INTERNAL,
            GatewayError::ConfigError { .. }
            | GatewayError::ConfigValidationError { .. }
            | GatewayError::InvalidConfigValueError { .. } => error_code::CONFIG,
        }
    }

    /// Every failure behind `/orders` is reported as a server error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Client-facing text; the full error (user, database, fault string) only
    /// goes to the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::ApiError(_) | GatewayError::RpcStatus { .. } => "ERP service unavailable",
            GatewayError::RpcFault { .. } => "ERP rejected the request",
            GatewayError::AuthenticationFailed { .. } => "ERP authentication failed",
            GatewayError::XmlParse { .. } | GatewayError::UnexpectedResponse { .. } => {
                "ERP returned an invalid response"
            }
            _ => "Internal server error",
        }
    }

    /// 給使用者的修正建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GatewayError::ConfigError { .. } | GatewayError::ConfigValidationError { .. } => {
                "Check the TOML syntax of the configuration file"
            }
            GatewayError::InvalidConfigValueError { .. } => {
                "Fix the reported value or export the environment variable it references"
            }
            GatewayError::IoError(_) => "Make sure the configuration file exists and is readable",
            GatewayError::AuthenticationFailed { .. } => "Verify the ERP database name and credentials",
            GatewayError::ApiError(_) | GatewayError::RpcStatus { .. } => {
                "Verify that the ERP URL is reachable from this host"
            }
            _ => "Inspect the gateway logs for details",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.error_code(), "request failed: {}", self);
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.public_message(),
        });
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
