use crate::core::{BulkReadQuery, ErpClient, Record};
use crate::utils::error::Result;

/// Authenticates and runs one capped `search_read` per call.
pub struct OrderFetcher<C: ErpClient> {
    client: C,
    query: BulkReadQuery,
}

impl<C: ErpClient> OrderFetcher<C> {
    pub fn new(client: C, query: BulkReadQuery) -> Self {
        Self { client, query }
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Record>> {
        let uid = self.client.authenticate().await?;
        let mut records = self.client.bulk_read(uid, &self.query).await?;

        if records.len() > self.query.limit {
            tracing::warn!(
                "Remote returned {} records for limit {}, truncating",
                records.len(),
                self.query.limit
            );
            records.truncate(self.query.limit);
        }

        tracing::info!("Fetched {} {} records", records.len(), self.query.model);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Uid;
    use crate::utils::error::GatewayError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockErp {
        rows: usize,
        reject_login: bool,
        auth_calls: Arc<AtomicUsize>,
        read_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ErpClient for MockErp {
        async fn authenticate(&self) -> Result<Uid> {
            self.auth_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_login {
                return Err(GatewayError::AuthenticationFailed {
                    db: "shop".to_string(),
                    username: "api".to_string(),
                });
            }
            Ok(2)
        }

        async fn bulk_read(&self, uid: Uid, query: &BulkReadQuery) -> Result<Vec<Record>> {
            self.read_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(uid, 2);
            Ok((0..self.rows)
                .map(|i| {
                    let mut data = serde_json::Map::new();
                    for field in &query.fields {
                        data.insert(field.clone(), serde_json::json!(i));
                    }
                    Record { data }
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_orders_authenticates_then_reads() {
        let erp = MockErp {
            rows: 3,
            ..Default::default()
        };
        let fetcher = OrderFetcher::new(erp.clone(), BulkReadQuery::default());

        let records = fetcher.fetch_orders().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].data.len(), 14);
        assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 1);
        assert_eq!(erp.read_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_orders_caps_oversized_results() {
        let erp = MockErp {
            rows: 1500,
            ..Default::default()
        };
        let fetcher = OrderFetcher::new(erp, BulkReadQuery::default());

        let records = fetcher.fetch_orders().await.unwrap();

        assert_eq!(records.len(), 1000);
    }

    #[tokio::test]
    async fn test_failed_login_skips_bulk_read() {
        let erp = MockErp {
            reject_login: true,
            ..Default::default()
        };
        let fetcher = OrderFetcher::new(erp.clone(), BulkReadQuery::default());

        let result = fetcher.fetch_orders().await;

        assert!(matches!(
            result,
            Err(GatewayError::AuthenticationFailed { .. })
        ));
        assert_eq!(erp.read_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_call_authenticates_again() {
        let erp = MockErp {
            rows: 1,
            ..Default::default()
        };
        let fetcher = OrderFetcher::new(erp.clone(), BulkReadQuery::default());

        fetcher.fetch_orders().await.unwrap();
        fetcher.fetch_orders().await.unwrap();

        assert_eq!(erp.auth_calls.load(Ordering::SeqCst), 2);
        assert_eq!(erp.read_calls.load(Ordering::SeqCst), 2);
    }
}
