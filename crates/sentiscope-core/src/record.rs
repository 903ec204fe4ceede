//! Persisted record types

use crate::grouping::{grouping, Group};
use crate::label::Label;
use crate::month::Month;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored customer-service interaction, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: i64,

    #[serde(rename = "atendente")]
    pub agent: String,

    /// Label predicted for the customer's text
    #[serde(rename = "sentimento_do_cliente")]
    pub customer_label: String,

    /// Group derived from `customer_label`
    #[serde(rename = "grupo_sentimento")]
    pub group: String,

    /// Polarity of the customer's label
    pub score: i32,

    #[serde(rename = "mes")]
    pub month: String,

    #[serde(rename = "nome_cliente")]
    pub customer: String,

    /// Label predicted for the agent's text
    #[serde(rename = "sentimento_atendente")]
    pub agent_label: String,

    /// Polarity of the agent's label
    #[serde(rename = "score_atendente")]
    pub agent_score: i32,
}

impl SentimentRecord {
    /// Re-derive group and scores from the stored labels and compare
    pub fn is_consistent(&self) -> bool {
        let (group, score) = grouping(&self.customer_label);
        let (_, agent_score) = grouping(&self.agent_label);
        self.group == group.as_str() && self.score == score && self.agent_score == agent_score
    }
}

/// A sentiment record that has not been stored yet
///
/// Group and scores are private and always derived from the labels, so a
/// `NewSentiment` can never disagree with the grouping policy.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSentiment {
    agent: String,
    customer: String,
    customer_label: String,
    agent_label: String,
    month: String,
    group: Group,
    score: i32,
    agent_score: i32,
}

impl NewSentiment {
    /// Build from two model predictions
    pub fn new(
        agent: impl Into<String>,
        customer: impl Into<String>,
        customer_label: Label,
        agent_label: Label,
        month: Month,
    ) -> Self {
        Self::from_names(
            agent,
            customer,
            customer_label.as_str(),
            agent_label.as_str(),
            month.as_str(),
        )
    }

    /// Build from raw label names, e.g. rows coming from a bulk import.
    /// Unknown labels land in [`Group::Other`] with score 0.
    pub fn from_names(
        agent: impl Into<String>,
        customer: impl Into<String>,
        customer_label: impl Into<String>,
        agent_label: impl Into<String>,
        month: impl Into<String>,
    ) -> Self {
        let customer_label = customer_label.into();
        let agent_label = agent_label.into();
        let (group, score) = grouping(&customer_label);
        let (_, agent_score) = grouping(&agent_label);

        Self {
            agent: agent.into(),
            customer: customer.into(),
            customer_label,
            agent_label,
            month: month.into(),
            group,
            score,
            agent_score,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn customer_label(&self) -> &str {
        &self.customer_label
    }

    pub fn agent_label(&self) -> &str {
        &self.agent_label
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn agent_score(&self) -> i32 {
        self.agent_score
    }

    /// Attach the identifier assigned by the store
    pub fn into_record(self, id: i64) -> SentimentRecord {
        SentimentRecord {
            id,
            agent: self.agent,
            customer_label: self.customer_label,
            group: self.group.as_str().to_string(),
            score: self.score,
            month: self.month,
            customer: self.customer,
            agent_label: self.agent_label,
            agent_score: self.agent_score,
        }
    }
}

/// A free-text action tied to an external event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "acao_id")]
    pub id: i64,

    #[serde(rename = "descricao")]
    pub description: String,

    /// Label predicted for the description
    #[serde(rename = "sentimento")]
    pub sentiment: String,

    pub event_id: i64,
    pub user_id: Option<i64>,
    pub agent_id: Option<i64>,

    #[serde(rename = "data_acao")]
    pub created_at: DateTime<Utc>,
}

/// An action about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewAction {
    pub description: String,
    pub sentiment: Label,
    pub event_id: i64,
    pub user_id: Option<i64>,
    pub agent_id: Option<i64>,
}

/// A customer-service event (`cs_events`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: i64,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data_abertura")]
    pub opened_at: DateTime<Utc>,
    #[serde(rename = "data_baixa")]
    pub closed_at: Option<DateTime<Utc>>,
    pub status_id: i64,
}
