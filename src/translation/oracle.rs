/*!
 * Oracle access: one instruction payload per sub-batch, sent to the
 * configured generative provider.
 */

use async_trait::async_trait;
use log::{debug, warn};

use crate::app_config::{Config, ProviderKind};
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

use super::prompts::TranslationPromptBuilder;

/// What the oracle handed back for one sub-batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleReply {
    /// Raw model output, still to be parsed
    Raw(String),
    /// No oracle is available; every string maps to itself
    Identity,
}

/// A source of translations for a batch of distinct strings
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Ask for translations of `texts`
    async fn complete(&self, texts: &[String]) -> Result<OracleReply, ProviderError>;
}

/// Configured backend
#[derive(Debug)]
enum Backend {
    Ollama { client: Ollama, model: String },
    Api { client: OpenAI, model: String },
    Unsupported(String),
}

/// Oracle backed by one of the configured HTTP providers
#[derive(Debug)]
pub struct OracleClient {
    backend: Backend,
    source_language: String,
    target_language: String,
    temperature: f32,
}

impl OracleClient {
    /// Build the client from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let oracle = &config.oracle;
        let backend = match &oracle.provider {
            ProviderKind::Ollama => Backend::Ollama {
                client: Ollama::new(oracle.ollama.api_url.clone(), oracle.timeout_secs),
                model: oracle.ollama.model.clone(),
            },
            ProviderKind::Api => Backend::Api {
                client: OpenAI::new(
                    oracle.api.api_key.clone(),
                    oracle.api.url.clone(),
                    oracle.api.auth_header.clone(),
                    oracle.timeout_secs,
                ),
                model: oracle.api.model.clone(),
            },
            ProviderKind::Unsupported(name) => {
                warn!("Provider '{}' is not supported; strings will be returned untranslated", name);
                Backend::Unsupported(name.clone())
            }
        };

        Self {
            backend,
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            temperature: oracle.temperature,
        }
    }

    fn prompt(&self, texts: &[String]) -> String {
        TranslationPromptBuilder::new(&self.source_language, &self.target_language)
            .with_texts(texts)
            .build()
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn complete(&self, texts: &[String]) -> Result<OracleReply, ProviderError> {
        match &self.backend {
            Backend::Ollama { client, model } => {
                let request = GenerationRequest::new(model.as_str(), self.prompt(texts))
                    .temperature(self.temperature);
                debug!("Sending {} strings to Ollama at {}", texts.len(), client.api_url());
                let response = client.complete(request).await?;
                Ok(OracleReply::Raw(Ollama::extract_text(&response)))
            }
            Backend::Api { client, model } => {
                let request = OpenAIRequest::new(model.as_str())
                    .add_message("user", self.prompt(texts))
                    .temperature(self.temperature);
                debug!("Sending {} strings to the chat completions API", texts.len());
                let response = client.complete(request).await?;
                if let Some(usage) = &response.usage {
                    debug!(
                        "Token usage: {} prompt, {} completion",
                        usage.prompt_tokens, usage.completion_tokens
                    );
                }
                Ok(OracleReply::Raw(OpenAI::extract_text(&response)))
            }
            Backend::Unsupported(name) => {
                debug!("Skipping oracle call for unsupported provider '{}'", name);
                Ok(OracleReply::Identity)
            }
        }
    }
}
