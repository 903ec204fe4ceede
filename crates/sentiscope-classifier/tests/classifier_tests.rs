//! Sentiment classifier integration tests
//!
//! Drive the full encode → infer → decode path with a mock backend and a
//! throwaway WordPiece vocabulary.

mod common;

use common::mock_backend::MockBackend;
use sentiscope_classifier::{load_tokenizer, SentimentClassifier, TextEncoder};
use sentiscope_core::Label;
use std::sync::Arc;

fn encoder(dir: &tempfile::TempDir) -> TextEncoder {
    std::fs::write(
        dir.path().join("vocab.txt"),
        "[PAD]\n[UNK]\n[CLS]\n[SEP]\nestou\nmuito\nsatisfeito\nirritado\n",
    )
    .unwrap();
    let tokenizer = load_tokenizer(dir.path()).unwrap();
    TextEncoder::new(tokenizer, 64, 16).unwrap()
}

#[test]
fn test_every_index_maps_to_its_label() {
    let dir = tempfile::tempdir().unwrap();

    for (idx, expected) in sentiscope_core::LABELS.iter().enumerate() {
        let classifier = SentimentClassifier::new(encoder(&dir), Box::new(MockBackend::new(idx)));
        assert_eq!(classifier.classify("estou muito satisfeito").unwrap(), *expected);
    }
}

#[test]
fn test_backend_sees_padded_batch() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::new(0));

    struct Shared(Arc<MockBackend>);
    impl sentiscope_classifier::InferenceBackend for Shared {
        fn predict(
            &self,
            inputs: &[(&str, candle_core::Tensor)],
        ) -> sentiscope_core::Result<std::collections::BTreeMap<String, candle_core::Tensor>> {
            self.0.predict(inputs)
        }
        fn device(&self) -> &candle_core::Device {
            self.0.device()
        }
    }

    let classifier = SentimentClassifier::new(encoder(&dir), Box::new(Shared(backend.clone())));
    assert_eq!(classifier.classify("").unwrap(), Label::Satisfaction);
    assert_eq!(classifier.classify("irritado").unwrap(), Label::Satisfaction);

    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.last_shape(), Some(vec![16, 64]));
}

#[test]
fn test_out_of_range_index_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new(7).with_classes(8);
    let classifier = SentimentClassifier::new(encoder(&dir), Box::new(backend));

    let err = classifier.classify("estou irritado").unwrap_err();
    assert!(err.is_fatal(), "expected configuration error, got {err}");
}

#[test]
fn test_nan_output_is_an_error_not_a_default_label() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = SentimentClassifier::new(
        encoder(&dir),
        Box::new(MockBackend::new(0).with_nan_output()),
    );

    assert!(classifier.classify("estou irritado").is_err());
}

#[test]
fn test_load_from_missing_directory_fails() {
    let config = sentiscope_classifier::ModelConfig::default().with_model_dir("/no/such/bert");
    let err = SentimentClassifier::load(&config).err().unwrap();
    assert!(err.is_fatal());
}
