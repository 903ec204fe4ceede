//! Inference adapter: runs a backend on an encoded batch and picks a class

use crate::encoder::EncodedBatch;
use candle_core::{DType, Device, Tensor};
use sentiscope_core::{Error, Result};
use std::collections::BTreeMap;

/// Input name for token ids
pub const INPUT_IDS: &str = "inputs";

/// Input name for the attention mask
pub const ATTENTION_MASK: &str = "inputs_1";

/// A model prediction function taking named tensors and returning named tensors
pub trait InferenceBackend: Send + Sync {
    /// Run the model. Inputs are `[(INPUT_IDS, ids), (ATTENTION_MASK, mask)]`,
    /// both f32 of shape `[batch, seq_len]`.
    fn predict(&self, inputs: &[(&str, Tensor)]) -> Result<BTreeMap<String, Tensor>>;

    /// Device the inputs should live on
    fn device(&self) -> &Device;
}

/// Find a named input, or fail with a configuration error
pub fn named_input<'a>(inputs: &'a [(&str, Tensor)], name: &str) -> Result<&'a Tensor> {
    inputs
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, t)| t)
        .ok_or_else(|| Error::config(format!("Missing model input '{}'", name)))
}

/// Calls the backend and extracts the best class index for row 0
pub struct InferenceAdapter {
    backend: Box<dyn InferenceBackend>,
}

impl InferenceAdapter {
    pub fn new(backend: Box<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Best-scoring class index of the first row
    pub fn predict_index(&self, batch: &EncodedBatch) -> Result<usize> {
        let (ids, mask) = batch.to_tensors(self.backend.device())?;
        let outputs = self
            .backend
            .predict(&[(INPUT_IDS, ids), (ATTENTION_MASK, mask)])?;

        // BTreeMap iteration order: first output by name
        let (name, scores) = outputs
            .iter()
            .next()
            .ok_or_else(|| Error::config("Model returned no outputs"))?;

        tracing::trace!(output = %name, shape = ?scores.dims(), "model output");
        argmax_first_row(scores)
    }
}

/// Index of the maximum value in row 0 of a `[batch, classes]` tensor.
/// NaN never wins; a row of only NaN is an inference error.
pub fn argmax_first_row(scores: &Tensor) -> Result<usize> {
    let (rows, cols) = scores.dims2().map_err(|_| {
        Error::config(format!(
            "Expected a [batch, classes] output, got shape {:?}",
            scores.dims()
        ))
    })?;

    if rows == 0 || cols == 0 {
        return Err(Error::config(format!(
            "Model output is empty: shape {:?}",
            scores.dims()
        )));
    }

    let row: Vec<f32> = scores
        .get(0)
        .and_then(|r| r.to_dtype(DType::F32))
        .and_then(|r| r.to_vec1())
        .map_err(|e| Error::inference(format!("Failed to read model output: {}", e)))?;

    row.iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (idx, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((idx, v)),
        })
        .map(|(idx, _)| idx)
        .ok_or_else(|| Error::inference("Model output row 0 is all NaN"))
}
