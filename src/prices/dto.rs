use serde::{Deserialize, Serialize};

use crate::prices::{repo_types::PriceRecord, services::SortKey};

/// Query string of `GET /prices/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub items: Vec<PriceRecord>,
}
