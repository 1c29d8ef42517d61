use serde::{Deserialize, Serialize};

use crate::prices::repo_types::PriceRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
}

/// Filter and ordering for one search. `min_price > max_price` simply matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub search_term: String,
    pub min_price: f64,
    pub max_price: f64,
    pub sort_key: SortKey,
}

impl QuerySpec {
    fn matches(&self, record: &PriceRecord, needle: &str) -> bool {
        let Some(name) = record.product_name.as_deref() else {
            return false;
        };
        // NaN fails both comparisons
        record.price >= self.min_price
            && record.price <= self.max_price
            && name.to_lowercase().contains(needle)
    }
}

/// Case-insensitive substring match on the product name plus an inclusive
/// price range, then a stable sort by `spec.sort_key`.
pub fn search(table: &[PriceRecord], spec: &QuerySpec) -> Vec<PriceRecord> {
    let needle = spec.search_term.to_lowercase();
    let mut hits: Vec<PriceRecord> = table
        .iter()
        .filter(|r| spec.matches(r, &needle))
        .cloned()
        .collect();

    // sort_by is stable: equal keys keep table order
    match spec.sort_key {
        SortKey::PriceAsc => hits.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => hits.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::NameAsc => hits.sort_by(|a, b| a.product_name.cmp(&b.product_name)),
    }
    hits
}
