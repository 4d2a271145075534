use std::time::Duration;

use anyhow::{Error, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// A message as it is sent over the wire to a chat completions
/// deployment.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct SearchAuthentication {
    pub r#type: String,
    pub key: String,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct SearchParameters {
    pub endpoint: String,
    pub index_name: String,
    pub authentication: SearchAuthentication,
    pub top_n_documents: u32,
    pub in_scope: bool,
    pub strictness: u8,
    pub role_information: String,
}

// Azure "On Your Data" extension. The deployment runs the search and
// grounds the answer itself, citations come back in
// `choices[].message.context`.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct DataSource {
    pub r#type: String,
    pub parameters: SearchParameters,
}

impl DataSource {
    pub fn azure_search(endpoint: &str, index_name: &str, key: &str) -> Self {
        DataSource {
            r#type: String::from("azure_search"),
            parameters: SearchParameters {
                endpoint: endpoint.to_string(),
                index_name: index_name.to_string(),
                authentication: SearchAuthentication {
                    r#type: String::from("api_key"),
                    key: key.to_string(),
                },
                top_n_documents: 5,
                in_scope: true,
                strictness: 3,
                role_information: String::from("Answer based on the provided documents."),
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<Vec<DataSource>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Citation {
    pub title: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MessageContext {
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Deserialize, Debug)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub context: Option<MessageContext>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    pub message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
pub struct Usage {
    pub total_tokens: u64,
}

#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<Usage>,
}

/// Client for a single Azure OpenAI chat deployment.
#[derive(Clone, Debug)]
pub struct AzureClient {
    client: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_key: String,
    api_version: String,
}

impl AzureClient {
    pub fn new(
        endpoint: &str,
        deployment: &str,
        api_key: &str,
        api_version: &str,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60 * 10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            deployment: deployment.to_string(),
            api_key: api_key.to_string(),
            api_version: api_version.to_string(),
        })
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }

    pub async fn completion(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, Error> {
        let response = self
            .client
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "Completion request failed ({}): {}",
                status,
                error_detail(&body)
            );
        }

        let completion = response.json::<CompletionResponse>().await?;
        Ok(completion)
    }
}

// Azure wraps failures as `{"error": {"code": ..., "message": ...}}`
// but proxies in front of it don't always.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
