use anyhow::Context;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, Connection, FromRow};
use time::{macros::format_description, Date};
use tracing::{debug, error, warn};

use crate::error::PriceDataError;
use crate::prices::repo_types::{PriceRecord, PriceTable};
use crate::storage::StorageClient;

#[derive(Debug, FromRow)]
struct PriceRow {
    product_name: Option<String>,
    price: Option<f64>,
    update_date: Option<String>,
}

impl From<PriceRow> for PriceRecord {
    fn from(r: PriceRow) -> Self {
        Self {
            product_name: r.product_name,
            price: r.price.unwrap_or(f64::NAN),
            update_date: r.update_date.as_deref().and_then(parse_date),
        }
    }
}

/// Fetch and decode the whole price table. Read fresh for every search.
///
/// The blob is a SQLite database holding `table`; keys ending in `.json` hold
/// a JSON array of rows instead.
pub async fn load_price_table(
    storage: &dyn StorageClient,
    key: &str,
    table: &str,
) -> Result<PriceTable, PriceDataError> {
    let body = match storage.get_object(key).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            warn!(key, "price data missing");
            return Err(PriceDataError::Missing(key.to_string()));
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), key, "price data load failed");
            return Err(PriceDataError::Unavailable(e));
        }
    };

    let decoded = if key.ends_with(".json") {
        serde_json::from_slice::<PriceTable>(&body).context("decode price rows")
    } else {
        read_sqlite(&body, table).await
    };
    let rows = decoded.map_err(|e| {
        error!(error = %format!("{e:#}"), key, "price data undecodable");
        PriceDataError::Decode(e)
    })?;

    debug!(key, rows = rows.len(), "price table loaded");
    Ok(rows)
}

async fn read_sqlite(body: &[u8], table: &str) -> anyhow::Result<PriceTable> {
    anyhow::ensure!(is_valid_table_name(table), "invalid table name {table:?}");

    // SQLite needs a real file; it is removed when `file` drops.
    let file = tempfile::NamedTempFile::new().context("create temp db file")?;
    tokio::fs::write(file.path(), body)
        .await
        .context("write temp db file")?;

    let mut conn = SqliteConnectOptions::new()
        .filename(file.path())
        .read_only(true)
        .connect()
        .await
        .context("open price db")?;

    let sql = format!(
        r#"
        SELECT CAST(product_name AS TEXT) AS product_name,
               CAST(price AS REAL) AS price,
               CAST(update_date AS TEXT) AS update_date
        FROM "{table}"
        "#
    );
    let rows = sqlx::query_as::<_, PriceRow>(&sql)
        .fetch_all(&mut conn)
        .await
        .with_context(|| format!("select from {table}"));
    if let Err(e) = conn.close().await {
        debug!(error = %e, "closing price db");
    }

    Ok(rows?.into_iter().map(PriceRecord::from).collect())
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Leading `YYYY-MM-DD` of a date or datetime string.
fn parse_date(raw: &str) -> Option<Date> {
    let head = raw.trim().get(..10)?;
    Date::parse(head, format_description!("[year]-[month]-[day]")).ok()
}
