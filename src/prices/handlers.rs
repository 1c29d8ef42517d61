use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, Result},
    prices::{
        dto::{SearchParams, SearchResponse},
        repo::load_price_table,
        services::{search, QuerySpec},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/prices/search", get(search_prices))
}

#[instrument(skip(state))]
pub async fn search_prices(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(params) = params?;
    let spec = QuerySpec {
        search_term: params.q,
        min_price: params.min_price.unwrap_or(0.0),
        max_price: params.max_price.unwrap_or(state.config.default_max_price),
        sort_key: params.sort,
    };
    if spec.min_price.is_nan() || spec.max_price.is_nan() {
        return Err(AppError::BadRequest("price bounds must be numbers".into()));
    }

    let table = load_price_table(
        state.storage.as_ref(),
        &state.config.price_data_key,
        &state.config.price_table,
    )
    .await?;
    let items = search(&table, &spec);

    if items.is_empty() {
        info!(term = %spec.search_term, "search found nothing");
    } else {
        info!(term = %spec.search_term, results = items.len(), "search completed");
    }
    Ok(Json(SearchResponse {
        count: items.len(),
        items,
    }))
}
