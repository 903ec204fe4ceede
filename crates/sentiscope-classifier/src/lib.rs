//! SentiScope Classifier
//!
//! Scores a text into one of six sentiment labels with a pretrained BERT model.
//!
//! The pipeline is:
//! - [`TextEncoder`]: tokenize, truncate and pad to a fixed `[batch, max_length]` shape
//! - [`InferenceAdapter`]: run an [`InferenceBackend`] and take the argmax of row 0
//! - [`SentimentClassifier`]: map that index into the label table
//!
//! [`BertBackend`] is the candle implementation used in production.

pub mod backend;
pub mod classifier;
pub mod encoder;
pub mod inference;
pub mod model_config;
pub mod model_loader;

pub use backend::BertBackend;
pub use classifier::SentimentClassifier;
pub use encoder::{EncodedBatch, TextEncoder};
pub use inference::{InferenceAdapter, InferenceBackend, ATTENTION_MASK, INPUT_IDS};
pub use model_config::{ModelConfig, ModelSource};
pub use model_loader::load_tokenizer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::SentimentClassifier;
    pub use crate::encoder::TextEncoder;
    pub use crate::inference::InferenceBackend;
    pub use crate::model_config::ModelConfig;
}
