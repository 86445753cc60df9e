use super::decode::decode_response;
use super::value::{encode_call, Value};
use crate::utils::error::{GatewayError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Posts XML-RPC calls to `{base_url}/xmlrpc/2/{service}`.
#[derive(Debug, Clone)]
pub struct XmlRpcClient {
    client: Client,
    base_url: String,
}

impl XmlRpcClient {
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, service: &str) -> String {
        format!("{}/xmlrpc/2/{}", self.base_url, service)
    }

    pub async fn call(&self, service: &str, method: &str, params: &[Value]) -> Result<Value> {
        let endpoint = self.endpoint(service);
        tracing::debug!("XML-RPC {} -> {}", method, endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(encode_call(method, params))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("XML-RPC {} response status: {}", method, status);
        if !status.is_success() {
            return Err(GatewayError::RpcStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        decode_response(&body)
    }
}
