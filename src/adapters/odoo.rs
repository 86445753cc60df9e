use crate::adapters::xmlrpc::{Value, XmlRpcClient};
use crate::domain::model::{BulkReadQuery, Record, Uid};
use crate::domain::ports::{ConfigProvider, ErpClient};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;

/// Odoo's external API over XML-RPC (`common` and `object` services).
#[derive(Debug, Clone)]
pub struct OdooClient {
    rpc: XmlRpcClient,
    db: String,
    username: String,
    password: String,
}

impl OdooClient {
    pub fn new(rpc: XmlRpcClient, db: String, username: String, password: String) -> Self {
        Self {
            rpc,
            db,
            username,
            password,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let rpc = XmlRpcClient::new(config.erp_url(), config.timeout_seconds())?;
        Ok(Self::new(
            rpc,
            config.database().to_string(),
            config.username().to_string(),
            config.password().to_string(),
        ))
    }
}

fn into_record(value: Value) -> Result<Record> {
    match value.into_json() {
        serde_json::Value::Object(data) => Ok(Record { data }),
        other => Err(GatewayError::UnexpectedResponse {
            message: format!("search_read returned a non-struct row: {}", other),
        }),
    }
}

#[async_trait]
impl ErpClient for OdooClient {
    async fn authenticate(&self) -> Result<Uid> {
        let params = [
            Value::from(self.db.as_str()),
            Value::from(self.username.as_str()),
            Value::from(self.password.as_str()),
            Value::empty_struct(),
        ];

        match self.rpc.call("common", "authenticate", &params).await? {
            Value::Int(uid) => {
                tracing::debug!("Authenticated as uid {} on '{}'", uid, self.db);
                Ok(uid)
            }
            Value::Bool(false) => Err(GatewayError::AuthenticationFailed {
                db: self.db.clone(),
                username: self.username.clone(),
            }),
            other => Err(GatewayError::UnexpectedResponse {
                message: format!("authenticate returned {:?}", other),
            }),
        }
    }

    async fn bulk_read(&self, uid: Uid, query: &BulkReadQuery) -> Result<Vec<Record>> {
        let fields = query
            .fields
            .iter()
            .map(|f| Value::from(f.as_str()))
            .collect::<Vec<_>>();
        let kwargs = Value::Struct(vec![
            ("fields".to_string(), Value::Array(fields)),
            ("limit".to_string(), Value::Int(query.limit as i64)),
        ]);
        let params = [
            Value::from(self.db.as_str()),
            Value::Int(uid),
            Value::from(self.password.as_str()),
            Value::from(query.model.as_str()),
            Value::from("search_read"),
            Value::Array(Vec::new()),
            kwargs,
        ];

        match self.rpc.call("object", "execute_kw", &params).await? {
            Value::Array(rows) => rows.into_iter().map(into_record).collect(),
            other => Err(GatewayError::UnexpectedResponse {
                message: format!("search_read returned {:?}", other),
            }),
        }
    }
}
