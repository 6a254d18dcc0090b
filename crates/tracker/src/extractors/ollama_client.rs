use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TrackerError;
use crate::traits::{Generation, TextGenerator};

type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a OllamaOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaGenerateResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<i64>,
    #[serde(default)]
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModelsResponse {
    pub models: Vec<OllamaModel>,
}

/// Client for the Ollama generate API
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    options: OllamaOptions,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name (e.g., "qwen2.5:7b")
    /// * `timeout` - Upper bound for a single generation request
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("HTTP client error: {}", e)))?;

        // Short workout logs; keep sampling tight for stable JSON.
        let options = OllamaOptions {
            temperature: Some(0.1),
            top_p: Some(0.9),
            num_predict: Some(2048),
        };

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_internal(&self, prompt: &str) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Some(&self.options),
        };

        tracing::info!(
            "Sending request to Ollama (model: {}, prompt length: {} chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TrackerError::Extraction("Ollama request timed out".to_string())
                } else {
                    TrackerError::Extraction(format!("Ollama request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TrackerError::Extraction(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaGenerateResponse = response.json().await.map_err(|e| {
            TrackerError::Extraction(format!("Failed to parse Ollama response: {}", e))
        })?;

        if let Some(total) = ollama_response.total_duration {
            tracing::info!(
                "Ollama generation complete: {:.2}s total, {} chars output",
                total as f64 / 1_000_000_000.0,
                ollama_response.response.len()
            );
        }

        Ok(ollama_response.response)
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let models_response: OllamaModelsResponse = response.json().await?;
        Ok(models_response.models)
    }

    /// Check if Ollama service is available
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// Verify the configured model is available
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.starts_with(&self.model)))
    }
}

#[async_trait::async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let content = self.generate_internal(prompt).await?;
        Ok(Generation { content })
    }
}
