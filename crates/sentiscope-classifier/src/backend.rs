//! Candle BERT backend for sequence classification

use crate::inference::{named_input, InferenceBackend, ATTENTION_MASK, INPUT_IDS};
use crate::model_config::ModelConfig;
use crate::model_loader::{check_label_count, get_device, load_var_builder, parse_json_config};
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use sentiscope_core::{Error, Label, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the single output tensor, `[batch, 6]` logits
pub const LOGITS: &str = "logits";

/// BERT encoder + optional pooler + linear classification head
pub struct BertBackend {
    model: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
    device: Device,
}

impl BertBackend {
    /// Load weights from a resolved model directory
    pub fn load(model_dir: &Path, config: &ModelConfig) -> Result<Self> {
        check_label_count(model_dir)?;

        let bert_config: BertConfig = parse_json_config(&model_dir.join("config.json"))?;
        let device = get_device(&config.device)?;
        let vb = load_var_builder(model_dir, &device)?;

        let (model, vb_backbone) = load_bert_backbone(&vb, &bert_config, &["bert", ""])?;
        let hidden_size = bert_config.hidden_size;

        let pooler =
            candle_nn::linear(hidden_size, hidden_size, vb_backbone.pp("pooler").pp("dense")).ok();
        if pooler.is_none() {
            tracing::debug!("No pooler weights found, classifying the raw [CLS] state");
        }

        let classifier = candle_nn::linear(hidden_size, Label::COUNT, vb.pp("classifier"))
            .map_err(|e| {
                Error::config(format!(
                    "Classification head must map {} -> {}: {}",
                    hidden_size,
                    Label::COUNT,
                    e
                ))
            })?;

        tracing::info!(
            "Loaded BERT classifier from {} (hidden_size={}, num_labels={})",
            model_dir.display(),
            hidden_size,
            Label::COUNT
        );

        Ok(Self {
            model,
            pooler,
            classifier,
            device,
        })
    }

    fn forward(&self, ids: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
        let input_ids = ids.to_dtype(DType::U32)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_states = self.model.forward(&input_ids, &token_type_ids, Some(mask))?;
        let cls = hidden_states.i((.., 0))?;

        let pooled = match &self.pooler {
            Some(dense) => dense.forward(&cls)?.tanh()?,
            None => cls,
        };

        self.classifier.forward(&pooled)
    }
}

impl InferenceBackend for BertBackend {
    fn predict(&self, inputs: &[(&str, Tensor)]) -> Result<BTreeMap<String, Tensor>> {
        let ids = named_input(inputs, INPUT_IDS)?;
        let mask = named_input(inputs, ATTENTION_MASK)?;

        if ids.dims() != mask.dims() {
            return Err(Error::config(format!(
                "Input shapes differ: ids {:?}, mask {:?}",
                ids.dims(),
                mask.dims()
            )));
        }

        let logits = self
            .forward(ids, mask)
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))?;

        Ok(BTreeMap::from([(LOGITS.to_string(), logits)]))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// Try each weight prefix in turn; returns the model and the builder it used
fn load_bert_backbone<'a>(
    vb: &VarBuilder<'a>,
    config: &BertConfig,
    prefixes: &[&str],
) -> Result<(BertModel, VarBuilder<'a>)> {
    let mut errors = Vec::new();

    for &prefix in prefixes {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };

        match BertModel::load(vb_prefix.clone(), config) {
            Ok(model) => {
                let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };
                tracing::info!("Loaded BERT backbone from '{}'", effective_prefix);
                return Ok((model, vb_prefix));
            }
            Err(e) => {
                errors.push(format!(
                    "{}: {}",
                    if prefix.is_empty() { "<root>" } else { prefix },
                    e
                ));
            }
        }
    }

    Err(Error::config(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}
