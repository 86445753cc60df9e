use crate::utils::error::{GatewayError, Result};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GatewayError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// A browser origin: scheme, host and optional port, nothing else.
pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    validate_url(field_name, origin)?;

    let trimmed = origin.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| GatewayError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: origin.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin must not contain a path, query or fragment".to_string(),
        });
    }
    if trimmed != origin {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin must not end with '/'".to_string(),
        });
    }

    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<()> {
    value
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Rejects values still carrying a `${VAR}` placeholder after substitution.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Unresolved environment variable placeholder".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
