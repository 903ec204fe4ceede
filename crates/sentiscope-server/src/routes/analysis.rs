//! Text classification endpoints

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{AnalysisRequest, BatchRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use sentiscope_core::{Group, Label, Month, NewSentiment};
use sentiscope_store::sentiments;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub sentimento_cliente: Label,
    pub grupo_cliente: Group,
    pub score_cliente: i32,
    pub sentimento_atendente: Label,
    pub grupo_atendente: Group,
    pub score_atendente: i32,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub texto: String,
    pub sentimento: Label,
    pub grupo: Group,
}

/// Classify both sides of a conversation and store the result
pub async fn analyze_text(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "analisar_texto").increment(1);

    let Json(body) = body?;
    let request = body.validate()?;

    let labels = state
        .classify_all(vec![request.customer_text, request.agent_text])
        .await?;
    let (customer_label, agent_label) = match labels[..] {
        [customer, agent] => (customer, agent),
        _ => return Err(AppError::Internal("expected two predictions".to_string())),
    };

    let new = NewSentiment::new(
        request.agent,
        request.customer,
        customer_label,
        agent_label,
        Month::current(),
    );
    let response = AnalysisResponse {
        sentimento_cliente: customer_label,
        grupo_cliente: new.group(),
        score_cliente: new.score(),
        sentimento_atendente: agent_label,
        grupo_atendente: agent_label.group(),
        score_atendente: new.agent_score(),
    };

    let record = state
        .store
        .call(move |tx| sentiments::insert_sentiment(tx, &new))
        .await?;

    tracing::info!(
        id = record.id,
        agent = %record.agent,
        customer_label = %customer_label,
        agent_label = %agent_label,
        "Analyzed conversation"
    );

    Ok(Json(response))
}

/// Classify a list of texts without storing anything
pub async fn batch_analyze(
    State(state): State<AppState>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<Vec<BatchItem>>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "batch_analyze").increment(1);

    let Json(body) = body?;
    let texts = body.validate()?;

    let labels = state.classify_all(texts.clone()).await?;
    tracing::debug!("Classified batch of {} texts", labels.len());

    let items = texts
        .into_iter()
        .zip(labels)
        .map(|(texto, sentimento)| BatchItem {
            texto,
            sentimento,
            grupo: sentimento.group(),
        })
        .collect();

    Ok(Json(items))
}
