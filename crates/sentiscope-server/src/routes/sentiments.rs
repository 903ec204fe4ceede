//! Stored sentiment records

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::ListQuery;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use sentiscope_core::SentimentRecord;
use sentiscope_store::{analytics, sentiments, GroupCounts};
use serde_json::{json, Value};

const NOT_FOUND: &str = "Sentimento não encontrado";
const NO_MATCHES: &str = "Nenhum sentimento encontrado com os filtros fornecidos.";

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<SentimentRecord>>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "sentimentos").increment(1);

    let Query(query) = query?;
    let filter = query.validate()?;

    let records = state
        .store
        .call(move |tx| sentiments::list_sentiments(tx, &filter))
        .await?;

    if records.is_empty() {
        return Err(AppError::not_found(NO_MATCHES));
    }
    Ok(Json(records))
}

pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SentimentRecord>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "sentimento").increment(1);

    let Path(id) = id?;
    state
        .store
        .call(move |tx| sentiments::get_sentiment(tx, id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

pub async fn delete_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "sentimento_delete").increment(1);

    let Path(id) = id?;
    let deleted = state
        .store
        .call(move |tx| sentiments::delete_sentiment(tx, id))
        .await?;

    if !deleted {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(id, "Deleted sentiment record");
    Ok(Json(json!({ "msg": "Sentimento deletado com sucesso" })))
}

pub async fn statistics(State(state): State<AppState>) -> Result<Json<GroupCounts>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "estatisticas").increment(1);

    let counts = state
        .store
        .call(|tx| analytics::group_counts(tx))
        .await?;
    Ok(Json(counts))
}
