use std::env;

use anyhow::{Context, Result, bail};

use crate::openai::DEFAULT_API_VERSION;

const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a helpful and friendly AI assistant. Answer clearly and objectively.";

/// Azure AI Search backend used for retrieval augmentation. Only
/// present when endpoint, key and index are all configured.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub endpoint: String,
    pub key: String,
    pub index: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint_url: String,
    pub deployment_name: String,
    pub api_key: String,
    pub api_version: String,
    pub search: Option<SearchConfig>,
    pub system_message: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub ui_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values are treated
    /// the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint_url = get("ENDPOINT_URL");
        let deployment_name = get("DEPLOYMENT_NAME");
        let api_key = get("AZURE_OPENAI_KEY");

        let (endpoint_url, deployment_name, api_key) = match (endpoint_url, deployment_name, api_key)
        {
            (Some(e), Some(d), Some(k)) => (e, d, k),
            (e, d, k) => {
                let missing: Vec<&str> = [
                    (e.is_none(), "ENDPOINT_URL"),
                    (d.is_none(), "DEPLOYMENT_NAME"),
                    (k.is_none(), "AZURE_OPENAI_KEY"),
                ]
                .into_iter()
                .filter_map(|(is_missing, name)| is_missing.then_some(name))
                .collect();
                bail!("Missing required env vars: {}", missing.join(", "));
            }
        };

        let search = match (
            get("AZURE_SEARCH_ENDPOINT"),
            get("AZURE_SEARCH_KEY"),
            get("AZURE_SEARCH_INDEX"),
        ) {
            (Some(endpoint), Some(key), Some(index)) => Some(SearchConfig {
                endpoint,
                key,
                index,
            }),
            _ => None,
        };

        let api_version =
            get("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let system_message =
            get("CHAT_SYSTEM_MESSAGE").unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string());
        let host = get("CHAT_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match get("CHAT_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid CHAT_PORT: {}", port))?,
            None => 5000,
        };
        let debug = get("CHAT_DEBUG")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let ui_path = get("CHAT_UI_PATH").unwrap_or_else(|| "./web-ui".to_string());

        Ok(Self {
            endpoint_url,
            deployment_name,
            api_key,
            api_version,
            search,
            system_message,
            host,
            port,
            debug,
            ui_path,
        })
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }
}
