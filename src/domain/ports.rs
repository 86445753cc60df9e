use crate::domain::model::{BulkReadQuery, Record, Uid};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn erp_url(&self) -> &str;
    fn database(&self) -> &str;
    fn username(&self) -> &str;
    fn password(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
}

/// What the gateway needs from the remote ERP.
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn authenticate(&self) -> Result<Uid>;
    async fn bulk_read(&self, uid: Uid, query: &BulkReadQuery) -> Result<Vec<Record>>;
}
