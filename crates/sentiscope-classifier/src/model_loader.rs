//! Model loading and bootstrap for the candle backend
//!
//! Every failure here is a configuration error: the service refuses to start
//! rather than serving with a half-loaded model.

use crate::model_config::{ModelConfig, ModelSource};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use sentiscope_core::{Error, Label, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const WEIGHTS_FILE: &str = "model.safetensors";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILES: [&str; 2] = ["tokenizer.json", "vocab.txt"];

/// Resolve the directory holding the model, downloading it first if needed
pub fn resolve_model_dir(config: &ModelConfig) -> Result<PathBuf> {
    match &config.source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Model directory does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo,
            revision,
            path,
        } => {
            if path.join(CONFIG_FILE).exists() && path.join(WEIGHTS_FILE).exists() {
                tracing::debug!("Model already present at {}", path.display());
                return Ok(path.clone());
            }
            download_from_huggingface(repo, revision, path)?;
            Ok(path.clone())
        }
    }
}

/// Fetch the model files from HuggingFace Hub and copy them into `dest`
fn download_from_huggingface(repo: &str, revision: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading model from HuggingFace: {}@{}", repo, revision);

    let api = Api::new().map_err(|e| {
        Error::config(format!("Failed to initialize HuggingFace API: {}", e))
    })?;
    let repo_obj = api.repo(Repo::with_revision(
        repo.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    std::fs::create_dir_all(dest)?;

    for file in [CONFIG_FILE, WEIGHTS_FILE] {
        let cached = repo_obj.get(file).map_err(|e| {
            Error::config(format!("Failed to download {} from {}: {}", file, repo, e))
        })?;
        std::fs::copy(&cached, dest.join(file))?;
        tracing::debug!("Fetched {}", file);
    }

    let mut found_tokenizer = false;
    for file in TOKENIZER_FILES {
        match repo_obj.get(file) {
            Ok(cached) => {
                std::fs::copy(&cached, dest.join(file))?;
                tracing::debug!("Fetched {}", file);
                found_tokenizer = true;
            }
            Err(_) => tracing::debug!("File not found: {}", file),
        }
    }

    if !found_tokenizer {
        return Err(Error::config(format!(
            "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
            repo
        )));
    }

    tracing::info!("Model available at: {}", dest.display());
    Ok(())
}

/// Parse a device name from configuration
pub fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::config(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::config(format!("Failed to initialize Metal: {}", e))),
        _ => Ok(Device::Cpu),
    }
}

/// Read and deserialize a JSON file such as `config.json`
pub fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::config(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::config(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Refuse a model whose `config.json` declares a label count other than six
pub fn check_label_count(model_dir: &Path) -> Result<()> {
    let config: serde_json::Value = parse_json_config(&model_dir.join(CONFIG_FILE))?;

    let declared = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|m| m.len())
        .or_else(|| {
            config
                .get("num_labels")
                .and_then(|v| v.as_u64())
                .map(|n| n as usize)
        });

    match declared {
        Some(n) if n != Label::COUNT => Err(Error::config(format!(
            "Model declares {} labels, expected {}",
            n,
            Label::COUNT
        ))),
        _ => Ok(()),
    }
}

/// Memory-map `model.safetensors` from the model directory
pub fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join(WEIGHTS_FILE);
    if !weights_path.exists() {
        return Err(Error::config(format!(
            "{} not found in {}",
            WEIGHTS_FILE,
            model_dir.display()
        )));
    }

    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::config(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

/// Load `tokenizer.json`, or build a BERT WordPiece tokenizer from `vocab.txt`
pub fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_dir.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::config(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_dir.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;
        use tokenizers::Model;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::config(format!("Failed to build WordPiece model: {}", e)))?;

        let sep_id = wordpiece.token_to_id("[SEP]").unwrap_or(102);
        let cls_id = wordpiece.token_to_id("[CLS]").unwrap_or(101);

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep_id),
            ("[CLS]".to_string(), cls_id),
        )));

        return Ok(tokenizer);
    }

    Err(Error::config(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}
