//! Request bodies and the checks each endpoint runs before touching the model
//!
//! Every field is optional at the serde level so a missing field produces the
//! endpoint's own message instead of a generic deserialization error.

use crate::error::AppError;
use sentiscope_store::SentimentFilter;
use serde::Deserialize;
use serde_json::Value;

pub const ACTION_REQUIRED: &str = "Descrição e event_id são obrigatórios.";
pub const EMPTY_TEXT_LIST: &str = "A lista de textos não pode estar vazia.";
pub const INVALID_TEXT_ITEM: &str = "Todos os textos devem ser strings não vazias.";

/// A request that failed validation; always answered with 422
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.0)
    }
}

type Validated<T> = Result<T, ValidationError>;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Zero is treated the same as an absent id
fn nonzero(id: Option<i64>) -> Option<i64> {
    id.filter(|&id| id != 0)
}

/// `POST /acoes/`
#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    pub descricao: Option<String>,
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
    pub agent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAction {
    pub description: String,
    pub event_id: i64,
    pub user_id: Option<i64>,
    pub agent_id: Option<i64>,
}

impl ActionRequest {
    pub fn validate(self) -> Validated<ValidAction> {
        let (Some(description), Some(event_id)) = (present(&self.descricao), nonzero(self.event_id))
        else {
            return Err(ValidationError::new(ACTION_REQUIRED));
        };

        Ok(ValidAction {
            description: description.to_string(),
            event_id,
            user_id: nonzero(self.user_id),
            agent_id: nonzero(self.agent_id),
        })
    }
}

/// `POST /analisar_texto/`
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    pub texto_cliente: Option<String>,
    pub texto_atendente: Option<String>,
    pub atendente: Option<String>,
    pub nome_cliente: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAnalysis {
    pub customer_text: String,
    pub agent_text: String,
    pub agent: String,
    pub customer: String,
}

impl AnalysisRequest {
    pub fn validate(self) -> Validated<ValidAnalysis> {
        let fields = [
            ("texto_cliente", &self.texto_cliente),
            ("texto_atendente", &self.texto_atendente),
            ("atendente", &self.atendente),
            ("nome_cliente", &self.nome_cliente),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| present(value).is_none())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::new(format!(
                "Campos obrigatórios faltando: {}",
                missing.join(", ")
            )));
        }

        Ok(ValidAnalysis {
            customer_text: self.texto_cliente.unwrap_or_default(),
            agent_text: self.texto_atendente.unwrap_or_default(),
            agent: self.atendente.unwrap_or_default(),
            customer: self.nome_cliente.unwrap_or_default(),
        })
    }
}

/// `POST /batch_analyze/`; items are raw JSON so non-strings get the endpoint's message
#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    pub textos: Option<Vec<Value>>,
}

impl BatchRequest {
    pub fn validate(self) -> Validated<Vec<String>> {
        let textos = match self.textos {
            Some(textos) if !textos.is_empty() => textos,
            _ => return Err(ValidationError::new(EMPTY_TEXT_LIST)),
        };

        textos
            .into_iter()
            .map(|item| match item {
                Value::String(text) if !text.is_empty() => Ok(text),
                _ => Err(ValidationError::new(INVALID_TEXT_ITEM)),
            })
            .collect()
    }
}

/// `GET /atendentes` and `GET /clientes`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Returns `(page, limit)`
    pub fn validate(&self, default_limit: u32) -> Validated<(u32, u32)> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ValidationError::new("page deve ser maior ou igual a 1"));
        }
        let page = u32::try_from(page)
            .map_err(|_| ValidationError::new("page fora do intervalo permitido"))?;

        let limit = limit_in_range(self.limit, default_limit)?;
        Ok((page, limit))
    }
}

/// `GET /sentimentos/`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub atendente: Option<String>,
    pub grupo_sentimento: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn validate(self) -> Validated<SentimentFilter> {
        let limit = limit_in_range(self.limit, 50)?;

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationError::new("offset deve ser maior ou igual a 0"));
        }
        let offset = u32::try_from(offset)
            .map_err(|_| ValidationError::new("offset fora do intervalo permitido"))?;

        // Empty filters are ignored, not matched literally
        Ok(SentimentFilter {
            agent: self.atendente.filter(|s| !s.is_empty()),
            group: self.grupo_sentimento.filter(|s| !s.is_empty()),
            limit,
            offset,
        })
    }
}

fn limit_in_range(limit: Option<i64>, default: u32) -> Validated<u32> {
    match limit {
        None => Ok(default),
        Some(limit @ 1..=100) => Ok(limit as u32),
        Some(_) => Err(ValidationError::new("limit deve estar entre 1 e 100")),
    }
}
