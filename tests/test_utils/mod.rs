//! Test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use axum::{Router, body::Body};
use http::Request;
use serde_json::Value;

use azchat::api::AppState;
use azchat::api::app;
use azchat::chat::{ChatBot, Completion, CompletionGateway, GenerationParams, Message};
use azchat::core::AppConfig;

pub const SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

fn ui_path() -> String {
    format!("{}/web-ui", env!("CARGO_MANIFEST_DIR"))
}

/// Gateway that answers every request the same way without touching
/// the network.
pub struct StubGateway {
    reply: Result<Completion, String>,
}

impl StubGateway {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(Completion {
                text: text.to_string(),
                tokens_used: 12,
                sources: None,
            }),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
        }
    }
}

#[async_trait]
impl CompletionGateway for StubGateway {
    async fn complete(
        &self,
        _history: &[Message],
        _params: &GenerationParams,
    ) -> Result<Completion, Error> {
        self.reply.clone().map_err(|e| anyhow!(e))
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn has_retrieval(&self) -> bool {
        false
    }
}

/// Gateway that panics mid turn, for exercising the server's fault
/// handling.
pub struct PanickingGateway;

#[async_trait]
impl CompletionGateway for PanickingGateway {
    async fn complete(
        &self,
        _history: &[Message],
        _params: &GenerationParams,
    ) -> Result<Completion, Error> {
        panic!("unexpected fault")
    }

    fn model(&self) -> &str {
        "panicking-model"
    }

    fn has_retrieval(&self) -> bool {
        false
    }
}

pub fn app_with_gateway(gateway: impl CompletionGateway + 'static) -> Router {
    let chatbot = ChatBot::new(Arc::new(gateway), SYSTEM_MESSAGE);
    let app_state = AppState::new(chatbot, &ui_path());
    app(Arc::new(RwLock::new(app_state)))
}

/// Creates a test application router backed by a gateway that always
/// replies "Hello from the stub".
pub fn test_app() -> Router {
    app_with_gateway(StubGateway::replying("Hello from the stub"))
}

/// Creates a test application whose chat service never initialized.
pub fn uninitialized_app() -> Router {
    app(Arc::new(RwLock::new(AppState::uninitialized(&ui_path()))))
}

/// Creates a test application that talks to a mock Azure OpenAI
/// deployment named `gpt-4o-mini` at `url`.
pub fn azure_app(url: &str, with_search: bool) -> Router {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("ENDPOINT_URL", url.to_string()),
        ("DEPLOYMENT_NAME", String::from("gpt-4o-mini")),
        ("AZURE_OPENAI_KEY", String::from("test-key")),
        ("CHAT_SYSTEM_MESSAGE", String::from(SYSTEM_MESSAGE)),
        ("CHAT_UI_PATH", ui_path()),
    ]);
    if with_search {
        vars.insert("AZURE_SEARCH_ENDPOINT", String::from("https://search.example.com"));
        vars.insert("AZURE_SEARCH_KEY", String::from("search-key"));
        vars.insert("AZURE_SEARCH_INDEX", String::from("docs"));
    }
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let chatbot = ChatBot::from_config(&config).unwrap();
    let app_state = AppState::new(chatbot, &config.ui_path);
    app(Arc::new(RwLock::new(app_state)))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
