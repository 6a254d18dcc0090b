use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::normalizer::ExerciseDictionary;
use crate::{Result, TrackerError};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:7b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Only needed by operations that touch the log store.
    pub database_url: Option<String>,
    pub ollama_url: String,
    pub ollama_model: String,
    pub request_timeout: Duration,
    /// JSON object of `"spelling": "canonical name"`; built-in dictionary when unset.
    pub dictionary_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dictionary_path: None,
        }
    }
}

impl TrackerConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| TrackerError::Config("DATABASE_URL is not set".to_string()))
    }

    pub fn load_dictionary(&self) -> Result<ExerciseDictionary> {
        let Some(path) = &self.dictionary_path else {
            return Ok(ExerciseDictionary::default());
        };

        let json = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!(
                "cannot read exercise dictionary {}: {}",
                path.display(),
                e
            ))
        })?;
        let dictionary = ExerciseDictionary::from_json_str(&json)?;

        info!(
            "Loaded {} exercise spellings from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }
}
