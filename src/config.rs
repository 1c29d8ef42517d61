use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO and friends). `None` uses the region's AWS endpoint.
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub s3: S3Config,
    pub user_data_key: String,
    pub price_data_key: String,
    pub price_table: String,
    pub default_max_price: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let s3 = S3Config {
            bucket: std::env::var("S3_BUCKET").context("S3_BUCKET must be set")?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "ap-northeast-2".into()),
            endpoint: non_empty_var("S3_ENDPOINT"),
            access_key: non_empty_var("S3_ACCESS_KEY"),
            secret_key: non_empty_var("S3_SECRET_KEY"),
        };
        if s3.access_key.is_some() != s3.secret_key.is_some() {
            anyhow::bail!("S3_ACCESS_KEY and S3_SECRET_KEY must be set together");
        }

        Ok(Self {
            s3,
            user_data_key: std::env::var("USER_DATA_KEY").unwrap_or_else(|_| "users.json".into()),
            price_data_key: std::env::var("PRICE_DATA_KEY")
                .unwrap_or_else(|_| "가격비교.db".into()),
            price_table: std::env::var("PRICE_TABLE").unwrap_or_else(|_| "prices".into()),
            default_max_price: std::env::var("DEFAULT_MAX_PRICE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(1_000_000.0),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
