use serde::{Deserialize, Serialize};

/// ERP user id returned by `authenticate`.
pub type Uid = i64;

/// One record as returned by the ERP, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }
}

pub const DEFAULT_MODEL: &str = "sale.order";
pub const MAX_LIMIT: usize = 1000;

pub const DEFAULT_FIELDS: [&str; 14] = [
    "id",
    "name",
    "create_date",
    "date_order",
    "state",
    "partner_id",
    "pricelist_id",
    "payment_term_id",
    "user_id",
    "fiscal_position_id",
    "amount_tax",
    "amount_untaxed",
    "amount_undiscounted",
    "amount_total",
];

/// `search_read` parameters: which model, which columns, how many rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReadQuery {
    pub model: String,
    pub fields: Vec<String>,
    pub limit: usize,
}

impl Default for BulkReadQuery {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            limit: MAX_LIMIT,
        }
    }
}
