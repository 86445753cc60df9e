pub mod fetcher;
pub mod gateway;

pub use crate::domain::model::{BulkReadQuery, Record, Uid};
pub use crate::domain::ports::{ConfigProvider, ErpClient};
pub use crate::utils::error::Result;
