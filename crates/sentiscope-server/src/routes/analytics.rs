//! Dashboard aggregates

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::PageQuery;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use sentiscope_store::analytics as queries;
use sentiscope_store::{Distribution, MonthlyEvolution, Ranking};

const AGENTS_DEFAULT_LIMIT: u32 = 8;
const CUSTOMERS_DEFAULT_LIMIT: u32 = 10;

pub async fn top_agents(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Ranking>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "atendentes").increment(1);

    let Query(query) = query?;
    let (page, limit) = query.validate(AGENTS_DEFAULT_LIMIT)?;

    let ranking = state
        .store
        .call(move |tx| queries::top_agents(tx, page, limit))
        .await?;
    Ok(Json(ranking))
}

pub async fn top_customers(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Ranking>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "clientes").increment(1);

    let Query(query) = query?;
    let (page, limit) = query.validate(CUSTOMERS_DEFAULT_LIMIT)?;

    let ranking = state
        .store
        .call(move |tx| queries::top_customers(tx, page, limit))
        .await?;
    Ok(Json(ranking))
}

pub async fn performance(State(state): State<AppState>) -> Result<Json<Distribution>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "performance-geral").increment(1);

    let distribution = state.store.call(|tx| queries::label_distribution(tx)).await?;
    Ok(Json(distribution))
}

pub async fn monthly_evolution(
    State(state): State<AppState>,
) -> Result<Json<MonthlyEvolution>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "evolucao-mensal").increment(1);

    let evolution = state.store.call(|tx| queries::monthly_evolution(tx)).await?;
    Ok(Json(evolution))
}
