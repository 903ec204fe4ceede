//! Shared application state

use crate::config::ServerConfig;
use crate::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use sentiscope_classifier::SentimentClassifier;
use sentiscope_core::Label;
use sentiscope_store::Store;
use std::sync::Arc;

/// Everything a handler needs. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<SentimentClassifier>,
    pub store: Store,
    pub config: Arc<ServerConfig>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        classifier: SentimentClassifier,
        store: Store,
        config: ServerConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            store,
            config: Arc::new(config),
            metrics,
        }
    }

    /// Classify one text on the blocking pool
    pub async fn classify(&self, text: String) -> Result<Label, AppError> {
        let classifier = Arc::clone(&self.classifier);
        let label = tokio::task::spawn_blocking(move || classifier.classify(&text)).await??;
        Ok(label)
    }

    /// Classify several texts in order with a single blocking task
    pub async fn classify_all(&self, texts: Vec<String>) -> Result<Vec<Label>, AppError> {
        let classifier = Arc::clone(&self.classifier);
        let labels = tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|text| classifier.classify(text))
                .collect::<sentiscope_core::Result<Vec<_>>>()
        })
        .await??;
        Ok(labels)
    }
}
