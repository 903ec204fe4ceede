//! Text encoder: raw text to fixed-shape id and mask arrays

use candle_core::{Device, Tensor};
use sentiscope_core::{Error, Result};
use tokenizers::{Tokenizer, TruncationParams};

/// Encoded input ready for the model
///
/// `input_ids` and `attention_mask` are row-major `[rows, seq_len]` arrays.
/// Rows past `real_rows` are zero-filled batch padding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub input_ids: Vec<f32>,
    pub attention_mask: Vec<f32>,
    pub rows: usize,
    pub real_rows: usize,
    pub seq_len: usize,
}

impl EncodedBatch {
    /// One row of token ids
    pub fn ids_row(&self, row: usize) -> &[f32] {
        &self.input_ids[row * self.seq_len..(row + 1) * self.seq_len]
    }

    /// One row of the attention mask
    pub fn mask_row(&self, row: usize) -> &[f32] {
        &self.attention_mask[row * self.seq_len..(row + 1) * self.seq_len]
    }

    /// Build `[rows, seq_len]` f32 tensors for ids and mask
    pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor)> {
        let shape = (self.rows, self.seq_len);
        let ids = Tensor::from_vec(self.input_ids.clone(), shape, device)
            .map_err(|e| Error::inference(format!("Failed to create input tensor: {}", e)))?;
        let mask = Tensor::from_vec(self.attention_mask.clone(), shape, device)
            .map_err(|e| Error::inference(format!("Failed to create mask tensor: {}", e)))?;
        Ok((ids, mask))
    }
}

/// Tokenizes text into fixed-length rows and pads the batch dimension
pub struct TextEncoder {
    tokenizer: Tokenizer,
    max_length: usize,
    min_batch_size: usize,
    pad_id: u32,
}

impl TextEncoder {
    /// Wrap a tokenizer. Its own padding is disabled; truncation is set to
    /// `max_length` so special tokens survive a cut.
    pub fn new(mut tokenizer: Tokenizer, max_length: usize, min_batch_size: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(Error::config("max_length must be greater than zero"));
        }

        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| Error::config(format!("Truncation config: {}", e)))?;

        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        Ok(Self {
            tokenizer,
            max_length,
            min_batch_size,
            pad_id,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn min_batch_size(&self) -> usize {
        self.min_batch_size
    }

    /// Encode a single text as row 0 of a padded batch
    pub fn encode(&self, text: &str) -> Result<EncodedBatch> {
        self.encode_batch(&[text])
    }

    /// Encode several texts; rows keep input order
    pub fn encode_batch(&self, texts: &[&str]) -> Result<EncodedBatch> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::inference(format!("Tokenization failed: {}", e)))?;

        let seq_len = self.max_length;
        let real_rows = encodings.len();
        let rows = real_rows.max(self.min_batch_size).max(1);

        let mut input_ids = Vec::with_capacity(rows * seq_len);
        let mut attention_mask = Vec::with_capacity(rows * seq_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let mask = enc.get_attention_mask();
            let len = ids.len().min(seq_len);

            input_ids.extend(ids[..len].iter().map(|&id| id as f32));
            attention_mask.extend(mask[..len].iter().map(|&m| m as f32));

            let pad = seq_len - len;
            input_ids.extend(std::iter::repeat(self.pad_id as f32).take(pad));
            attention_mask.extend(std::iter::repeat(0f32).take(pad));
        }

        // Batch padding rows are all zeros
        input_ids.resize(rows * seq_len, 0.0);
        attention_mask.resize(rows * seq_len, 0.0);

        Ok(EncodedBatch {
            input_ids,
            attention_mask,
            rows,
            real_rows,
            seq_len,
        })
    }
}
