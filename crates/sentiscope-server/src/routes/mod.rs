//! HTTP routes

pub mod actions;
pub mod analysis;
pub mod analytics;
pub mod health;
pub mod sentiments;

use crate::config::CorsConfig;
use crate::error::AppError;
use crate::security;
use crate::state::AppState;
use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Dashboard analytics
        .route("/atendentes", get(analytics::top_agents))
        .route("/clientes", get(analytics::top_customers))
        .route("/performance-geral", get(analytics::performance))
        .route("/evolucao-mensal", get(analytics::monthly_evolution))
        // Classification
        .route("/acoes/", post(actions::create_action))
        .route("/analisar_texto/", post(analysis::analyze_text))
        .route("/batch_analyze/", post(analysis::batch_analyze))
        // Records
        .route("/sentimentos/", get(sentiments::list))
        .route("/sentimentos/estatisticas/", get(sentiments::statistics))
        .route(
            "/sentimentos/:id",
            get(sentiments::get_one).delete(sentiments::delete_one),
        );

    let api = if state.config.auth.require_api_key {
        api.route_layer(middleware::from_fn_with_state(
            state.clone(),
            security::require_api_key,
        ))
    } else {
        api
    };

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health/", get(health::health))
        .route("/metrics", get(health::metrics))
        .merge(api)
        .fallback(fallback)
        .layer(
            // Trace wraps CORS so preflight responses are logged too
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(
                    |request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            id = %uuid::Uuid::new_v4(),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    },
                ))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn fallback() -> AppError {
    AppError::not_found("Not Found")
}
