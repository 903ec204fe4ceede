//! Sentiment classifier: text in, label out

use crate::backend::BertBackend;
use crate::encoder::TextEncoder;
use crate::inference::{InferenceAdapter, InferenceBackend};
use crate::model_config::ModelConfig;
use crate::model_loader::{load_tokenizer, resolve_model_dir};
use sentiscope_core::{Error, Label, Result};
use std::time::Instant;

/// Composes the text encoder with the inference adapter.
///
/// Immutable once built; share it behind an `Arc`.
pub struct SentimentClassifier {
    encoder: TextEncoder,
    adapter: InferenceAdapter,
}

impl SentimentClassifier {
    pub fn new(encoder: TextEncoder, backend: Box<dyn InferenceBackend>) -> Self {
        Self {
            encoder,
            adapter: InferenceAdapter::new(backend),
        }
    }

    /// Resolve (and bootstrap if needed) the model directory, then load the
    /// tokenizer and the candle BERT backend
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let model_dir = resolve_model_dir(config)?;
        let tokenizer = load_tokenizer(&model_dir)?;
        let encoder = TextEncoder::new(tokenizer, config.max_length, config.min_batch_size)?;
        let backend = BertBackend::load(&model_dir, config)?;

        Ok(Self::new(encoder, Box::new(backend)))
    }

    /// Predict the sentiment label of a single text
    pub fn classify(&self, text: &str) -> Result<Label> {
        let start = Instant::now();

        let batch = self.encoder.encode(text)?;
        let index = self.adapter.predict_index(&batch)?;
        let label = Label::from_index(index).ok_or_else(|| {
            Error::config(format!(
                "Model predicted index {} but only {} labels exist",
                index,
                Label::COUNT
            ))
        })?;

        let latency_us = start.elapsed().as_micros() as f64;
        metrics::histogram!("sentiscope_inference_latency_us").record(latency_us);
        tracing::debug!(label = %label, latency_us, "classified text");

        Ok(label)
    }

    pub fn encoder(&self) -> &TextEncoder {
        &self.encoder
    }
}
