use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::storage::{Storage, StorageClient};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub sessions: SessionStore,
    /// Serializes load-modify-save of the user table within this process.
    pub signup_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let storage = Arc::new(Storage::new(&config.s3).await?) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(config, storage))
    }

    pub fn from_parts(config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            config,
            storage,
            sessions: SessionStore::default(),
            signup_lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_storage(Arc::new(crate::storage::testing::MemoryStorage::default()))
    }

    #[cfg(test)]
    pub fn with_storage(storage: Arc<dyn StorageClient>) -> Self {
        let config = Arc::new(AppConfig {
            s3: crate::config::S3Config {
                bucket: "fake".into(),
                region: "ap-northeast-2".into(),
                endpoint: None,
                access_key: None,
                secret_key: None,
            },
            user_data_key: "users.json".into(),
            price_data_key: "prices.json".into(),
            price_table: "prices".into(),
            default_max_price: 1_000_000.0,
        });
        Self::from_parts(config, storage)
    }
}
