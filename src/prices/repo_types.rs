use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One row of the price comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(default)]
    pub product_name: Option<String>, // rows without a name never match a search
    pub price: f64,
    #[serde(default, with = "iso_date::option")]
    pub update_date: Option<Date>,
}

pub type PriceTable = Vec<PriceRecord>;
