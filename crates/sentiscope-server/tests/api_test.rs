//! HTTP API tests
//!
//! Drive the router in-process with a keyword-driven inference backend and a
//! throwaway SQLite database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use candle_core::{Device, Tensor};
use sentiscope_classifier::{load_tokenizer, InferenceBackend, SentimentClassifier, TextEncoder};
use sentiscope_core::{Error, Month, Result};
use sentiscope_server::{create_router, AppState, ServerConfig};
use sentiscope_store::{actions, Store};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tempfile::TempDir;
use tower::ServiceExt;

const VOCAB: &str = "[PAD]\n[UNK]\n[CLS]\n[SEP]\notimo\npessimo\nurgente\nduvida\nok\n";
const API_KEY: &str = "chave-de-teste";

/// Picks the class from the first known keyword in row 0:
/// otimo → Satisfação, pessimo → Raiva/Irritação, urgente → Urgência/Pressão,
/// duvida → Confusão, anything else → Neutro
struct KeywordBackend {
    device: Device,
}

impl InferenceBackend for KeywordBackend {
    fn predict(&self, inputs: &[(&str, Tensor)]) -> Result<BTreeMap<String, Tensor>> {
        let ids = &inputs[0].1;
        let (rows, _) = ids.dims2().map_err(|e| Error::inference(e.to_string()))?;
        let first: Vec<f32> = ids
            .get(0)
            .and_then(|row| row.to_vec1::<f32>())
            .map_err(|e| Error::inference(e.to_string()))?;

        let class = first
            .iter()
            .find_map(|&id| match id as u32 {
                4 => Some(0),
                5 => Some(4),
                6 => Some(3),
                7 => Some(2),
                _ => None,
            })
            .unwrap_or(5);

        let mut data = vec![0f32; rows * 6];
        data[class] = 1.0;
        let logits = Tensor::from_vec(data, (rows, 6), &self.device)
            .map_err(|e| Error::inference(e.to_string()))?;
        Ok(BTreeMap::from([("logits".to_string(), logits)]))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

struct TestApp {
    router: Router,
    store: Store,
    _dir: TempDir,
}

fn test_app(require_api_key: bool) -> TestApp {
    test_app_with(|config| config.auth.require_api_key = require_api_key)
}

fn test_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vocab.txt"), VOCAB).unwrap();

    let tokenizer = load_tokenizer(dir.path()).unwrap();
    let encoder = TextEncoder::new(tokenizer, 64, 16).unwrap();
    let classifier = SentimentClassifier::new(
        encoder,
        Box::new(KeywordBackend {
            device: Device::Cpu,
        }),
    );

    let store = Store::open(dir.path().join("test.db")).unwrap();

    let mut config = ServerConfig::default();
    config.auth.api_key = Some(API_KEY.to_string());
    configure(&mut config);

    let state = AppState::new(classifier, store.clone(), config, None);
    TestApp {
        router: create_router(state),
        store,
        _dir: dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn delete(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn analyze(app: &TestApp, agent: &str, customer_text: &str) -> Value {
    let (status, body) = post(
        app,
        "/analisar_texto/",
        json!({
            "texto_cliente": customer_text,
            "texto_atendente": "ok",
            "atendente": agent,
            "nome_cliente": "Bruno",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let app = test_app(false);
    let (status, body) = get(&app, "/health/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_batch_analyze_validation() {
    let app = test_app(false);

    let (status, body) = post(&app, "/batch_analyze/", json!({ "textos": [] })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "A lista de textos não pode estar vazia.");

    let (status, body) = post(&app, "/batch_analyze/", json!({ "textos": ["", "ok"] })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "Todos os textos devem ser strings não vazias.");

    let (status, _) = post(&app, "/batch_analyze/", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_batch_analyze_keeps_order() {
    let app = test_app(false);

    let (status, body) = post(
        &app,
        "/batch_analyze/",
        json!({ "textos": ["otimo atendimento", "pessimo", "ok"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "texto": "otimo atendimento", "sentimento": "Satisfação", "grupo": "Positivo" },
            { "texto": "pessimo", "sentimento": "Raiva/Irritação", "grupo": "Negativo" },
            { "texto": "ok", "sentimento": "Neutro", "grupo": "Neutro" },
        ])
    );

    // Nothing is persisted by a batch
    let (status, _) = get(&app, "/sentimentos/estatisticas/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_text_missing_fields() {
    let app = test_app(false);

    let (status, body) = post(
        &app,
        "/analisar_texto/",
        json!({ "texto_cliente": "otimo", "atendente": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["detail"],
        "Campos obrigatórios faltando: texto_atendente, atendente, nome_cliente"
    );
}

#[tokio::test]
async fn test_analyze_text_stores_record() {
    let app = test_app(false);

    let body = post(
        &app,
        "/analisar_texto/",
        json!({
            "texto_cliente": "pessimo servico",
            "texto_atendente": "otimo",
            "atendente": "Ana",
            "nome_cliente": "Bruno",
        }),
    )
    .await
    .1;
    assert_eq!(
        body,
        json!({
            "sentimento_cliente": "Raiva/Irritação",
            "grupo_cliente": "Negativo",
            "score_cliente": -1,
            "sentimento_atendente": "Satisfação",
            "grupo_atendente": "Positivo",
            "score_atendente": 1,
        })
    );

    let (status, list) = get(&app, "/sentimentos/").await;
    assert_eq!(status, StatusCode::OK);
    let records = list.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["atendente"], "Ana");
    assert_eq!(records[0]["nome_cliente"], "Bruno");
    assert_eq!(records[0]["grupo_sentimento"], "Negativo");
    assert_eq!(records[0]["score"], -1);
    assert_eq!(records[0]["score_atendente"], 1);
    assert_eq!(records[0]["mes"], Month::current().as_str());

    let (status, stats) = get(&app, "/sentimentos/estatisticas/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({ "total": 1, "positivos": 0, "negativos": 1, "neutros": 0 })
    );
}

#[tokio::test]
async fn test_list_filters_and_empty_result() {
    let app = test_app(false);
    analyze(&app, "Ana", "otimo").await;
    analyze(&app, "Ana", "pessimo").await;
    analyze(&app, "Caio", "otimo").await;

    let (_, body) = get(&app, "/sentimentos/?atendente=Ana").await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(&app, "/sentimentos/?atendente=Ana&grupo_sentimento=Positivo").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // An empty filter value is ignored
    let (_, body) = get(&app, "/sentimentos/?atendente=&limit=2").await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get(&app, "/sentimentos/?atendente=Ninguem").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "Nenhum sentimento encontrado com os filtros fornecidos."
    );

    let (status, _) = get(&app, "/sentimentos/?limit=101").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_and_delete_by_id() {
    let app = test_app(false);

    let (status, body) = delete(&app, "/sentimentos/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Sentimento não encontrado");

    analyze(&app, "Ana", "duvida").await;
    let (_, list) = get(&app, "/sentimentos/").await;
    let id = list[0]["id"].as_i64().unwrap();

    let (status, record) = get(&app, &format!("/sentimentos/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["sentimento_do_cliente"], "Confusão");
    assert_eq!(record["grupo_sentimento"], "Neutro");

    let (status, body) = delete(&app, &format!("/sentimentos/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Sentimento deletado com sucesso" }));

    let (status, _) = get(&app, &format!("/sentimentos/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/sentimentos/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_action_validation() {
    let app = test_app(false);

    let (status, body) = post(&app, "/acoes/", json!({ "descricao": "Retornar contato" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "Descrição e event_id são obrigatórios.");

    let (status, _) = post(&app, "/acoes/", json!({ "descricao": "", "event_id": 1 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_action_with_unknown_event() {
    let app = test_app(false);

    let (status, body) = post(
        &app,
        "/acoes/",
        json!({ "descricao": "cliente urgente", "event_id": 42, "agent_id": 7 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event_id"], 42);
    assert_eq!(body["sentimento"], "Urgência/Pressão");
    assert_eq!(body["descricao"], "cliente urgente");
    assert_eq!(body["agent_id"], 7);
    assert!(body["user_id"].is_null());
    assert!(body["acao_id"].as_i64().unwrap() > 0);
    assert!(body["data_acao"].is_string());

    let event = app
        .store
        .call(|tx| actions::find_event(tx, 42))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.description, actions::EVENT_PLACEHOLDER);
}

#[tokio::test]
async fn test_rankings_and_dashboard() {
    let app = test_app(false);
    analyze(&app, "Ana", "otimo").await;
    analyze(&app, "Ana", "otimo").await;
    analyze(&app, "Caio", "pessimo").await;

    let (status, body) = get(&app, "/atendentes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 8);
    assert_eq!(body["items"][0], json!({ "nome": "Ana", "score": 2 }));
    assert_eq!(body["items"][1], json!({ "nome": "Caio", "score": -1 }));

    let (_, body) = get(&app, "/clientes?page=1&limit=5").await;
    assert_eq!(body["limit"], 5);
    assert_eq!(body["items"][0], json!({ "nome": "Bruno", "score": 1 }));

    let (status, _) = get(&app, "/atendentes?limit=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get(&app, "/clientes?page=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = get(&app, "/performance-geral").await;
    assert_eq!(body["labels"].as_array().unwrap().len(), 6);
    assert_eq!(body["valores"][0], 66.7);
    assert_eq!(body["valores"][4], 33.3);

    let (_, body) = get(&app, "/evolucao-mensal").await;
    let month = Month::current().index();
    assert_eq!(body["meses"].as_array().unwrap().len(), 12);
    assert_eq!(body["positivo"][month], 2);
    assert_eq!(body["negativo"][month], 1);
}

#[tokio::test]
async fn test_empty_dashboard() {
    let app = test_app(false);

    let (status, body) = get(&app, "/performance-geral").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valores"], json!([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));

    let (status, body) = get(&app, "/sentimentos/estatisticas/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "Nenhum dado de sentimento encontrado para estatísticas."
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(false);

    let request = Request::post("/batch_analyze/")
        .header("content-type", "application/json")
        .body(Body::from("{\"textos\": ["))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_api_key_guard() {
    let app = test_app(true);

    let (status, body) = get(&app, "/sentimentos/estatisticas/").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "detail": "Invalid API Key" }));

    let wrong = Request::get("/atendentes")
        .header("X-API-Key", "errada")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let right = Request::get("/atendentes")
        .header("X-API-Key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, right).await;
    assert_eq!(status, StatusCode::OK);

    // Health stays open
    let (status, _) = get(&app, "/health/").await;
    assert_eq!(status, StatusCode::OK);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/batch_analyze/")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_preflight_any_origin() {
    let app = test_app_with(|config| config.cors.allowed_origins = vec!["*".to_string()]);

    let response = app
        .router
        .clone()
        .oneshot(preflight("http://painel.example"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight_listed_origin() {
    let app = test_app_with(|config| {
        config.cors.allowed_origins = vec!["http://painel.example".to_string()]
    });

    let allowed = app
        .router
        .clone()
        .oneshot(preflight("http://painel.example"))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "http://painel.example"
    );

    let other = app
        .router
        .clone()
        .oneshot(preflight("http://outro.example"))
        .await
        .unwrap();
    assert!(other
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_cors_headers_on_regular_response() {
    let app = test_app(false);

    let request = Request::get("/health/")
        .header("origin", "http://localhost")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost"
    );
}
