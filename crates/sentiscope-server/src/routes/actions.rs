use crate::error::AppError;
use crate::state::AppState;
use crate::validation::ActionRequest;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use sentiscope_core::{ActionRecord, NewAction};
use sentiscope_store::actions;

/// Classify an action description and store it, creating placeholder
/// event/user/agent rows for unknown ids in the same transaction
pub async fn create_action(
    State(state): State<AppState>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionRecord>, AppError> {
    metrics::counter!("sentiscope_requests_total", "route" => "acoes").increment(1);

    let Json(body) = body?;
    let request = body.validate()?;

    let sentiment = state.classify(request.description.clone()).await?;

    let new = NewAction {
        description: request.description,
        sentiment,
        event_id: request.event_id,
        user_id: request.user_id,
        agent_id: request.agent_id,
    };
    let action = state
        .store
        .call(move |tx| actions::create_action(tx, &new))
        .await?;

    tracing::info!(
        acao_id = action.id,
        event_id = action.event_id,
        sentimento = %action.sentiment,
        "Created action"
    );
    Ok(Json(action))
}
