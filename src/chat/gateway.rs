//! Outbound calls to the hosted model.
use std::ops::RangeInclusive;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;

use super::models::Message;
use crate::core::{AppConfig, SearchConfig};
use crate::openai::{self, AzureClient, CompletionRequest, CompletionResponse, DataSource};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<f64> = 100.0..=4000.0;
pub const MAX_CITATIONS: usize = 3;

const UNTITLED_CITATION: &str = "Document";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub use_documents: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            use_documents: false,
        }
    }
}

impl GenerationParams {
    /// Resolve caller supplied parameters. Values outside the allowed
    /// range are replaced with the defaults, not rejected.
    ///
    /// `max_tokens` is taken as any JSON number. Fractional values in
    /// range are truncated.
    pub fn resolve(temperature: Option<f64>, max_tokens: Option<f64>, use_documents: bool) -> Self {
        let temperature = match temperature {
            Some(t) if TEMPERATURE_RANGE.contains(&t) => t,
            Some(t) => {
                tracing::warn!(
                    "Temperature {} out of range, using {}",
                    t,
                    DEFAULT_TEMPERATURE
                );
                DEFAULT_TEMPERATURE
            }
            None => DEFAULT_TEMPERATURE,
        };
        let max_tokens = match max_tokens {
            // Range check guarantees this fits
            Some(n) if MAX_TOKENS_RANGE.contains(&n) => n.trunc() as u32,
            Some(n) => {
                tracing::warn!("max_tokens {} out of range, using {}", n, DEFAULT_MAX_TOKENS);
                DEFAULT_MAX_TOKENS
            }
            None => DEFAULT_MAX_TOKENS,
        };

        Self {
            temperature,
            max_tokens,
            use_documents,
        }
    }
}

/// A successful generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u64,
    /// Titles of up to `MAX_CITATIONS` grounding documents, `None`
    /// when the reply wasn't grounded.
    pub sources: Option<Vec<String>>,
}

impl TryFrom<CompletionResponse> for Completion {
    type Error = Error;

    fn try_from(resp: CompletionResponse) -> Result<Self, Error> {
        let tokens_used = resp.usage.map(|u| u.total_tokens).unwrap_or(0);
        let message = resp
            .choices
            .into_iter()
            .next()
            .ok_or(anyhow!("Completion response contained no choices"))?
            .message;
        let text = message
            .content
            .ok_or(anyhow!("Completion response contained no message content"))?;

        let sources: Vec<String> = message
            .context
            .map(|ctx| {
                ctx.citations
                    .into_iter()
                    .take(MAX_CITATIONS)
                    .map(|c| c.title.unwrap_or_else(|| UNTITLED_CITATION.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            text,
            tokens_used,
            sources: (!sources.is_empty()).then_some(sources),
        })
    }
}

/// Turns a conversation history into the next assistant reply.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// `history` is the full transcript starting with the system
    /// anchor. A single attempt is made, errors are returned as is.
    async fn complete(
        &self,
        history: &[Message],
        params: &GenerationParams,
    ) -> Result<Completion, Error>;

    /// Name of the model or deployment replies come from
    fn model(&self) -> &str;

    /// Whether a retrieval backend is configured
    fn has_retrieval(&self) -> bool;
}

/// Gateway backed by an Azure OpenAI deployment with optional Azure AI
/// Search grounding.
pub struct AzureGateway {
    client: AzureClient,
    search: Option<SearchConfig>,
}

impl AzureGateway {
    pub fn new(client: AzureClient, search: Option<SearchConfig>) -> Self {
        Self { client, search }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = AzureClient::new(
            &config.endpoint_url,
            &config.deployment_name,
            &config.api_key,
            &config.api_version,
        )?;
        Ok(Self::new(client, config.search.clone()))
    }

    fn data_sources(&self, params: &GenerationParams) -> Option<Vec<DataSource>> {
        if !params.use_documents {
            return None;
        }
        match &self.search {
            Some(search) => Some(vec![DataSource::azure_search(
                &search.endpoint,
                &search.index,
                &search.key,
            )]),
            None => {
                tracing::debug!("Documents requested but no search backend is configured");
                None
            }
        }
    }
}

#[async_trait]
impl CompletionGateway for AzureGateway {
    async fn complete(
        &self,
        history: &[Message],
        params: &GenerationParams,
    ) -> Result<Completion, Error> {
        // TODO: Add a sliding window or summarizing compaction so long
        // sessions don't eventually exceed the model's context length
        let messages: Vec<openai::Message> = history.iter().map(openai::Message::from).collect();
        let request = CompletionRequest {
            messages: &messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
            data_sources: self.data_sources(params),
        };

        let resp = self.client.completion(&request).await?;
        Completion::try_from(resp)
    }

    fn model(&self) -> &str {
        self.client.deployment()
    }

    fn has_retrieval(&self) -> bool {
        self.search.is_some()
    }
}
