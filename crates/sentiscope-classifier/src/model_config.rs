//! Model configuration structures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the sentiment model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Where the model comes from
    #[serde(default)]
    pub source: ModelSource,

    /// Device to run on (cpu, cuda, mps)
    #[serde(default = "default_device")]
    pub device: String,

    /// Fixed token sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Batches with fewer rows are padded up to this size
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from a local directory holding `config.json`, `model.safetensors`
    /// and `tokenizer.json` or `vocab.txt`
    Local { path: PathBuf },

    /// Fetch from HuggingFace Hub into `path` when that directory is missing
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
        #[serde(default = "default_model_dir")]
        path: PathBuf,
    },
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    64
}

fn default_min_batch_size() -> usize {
    16
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("bert_model")
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::Local {
            path: default_model_dir(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::default(),
            device: default_device(),
            max_length: default_max_length(),
            min_batch_size: default_min_batch_size(),
        }
    }
}

impl ModelSource {
    /// Local directory the model is loaded from
    pub fn model_dir(&self) -> &Path {
        match self {
            Self::Local { path } | Self::HuggingFace { path, .. } => path,
        }
    }
}

impl ModelConfig {
    /// Load model configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> sentiscope_core::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| {
            sentiscope_core::Error::config(format!(
                "Failed to parse model config {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Point the source at a different local directory, keeping the repo if any
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match &mut self.source {
            ModelSource::Local { path } | ModelSource::HuggingFace { path, .. } => *path = dir,
        }
        self
    }

    /// Download from `repo` when the local directory is missing
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        let path = self.source.model_dir().to_path_buf();
        let revision = match &self.source {
            ModelSource::HuggingFace { revision, .. } => revision.clone(),
            ModelSource::Local { .. } => default_revision(),
        };
        self.source = ModelSource::HuggingFace {
            repo: repo.into(),
            revision,
            path,
        };
        self
    }
}
