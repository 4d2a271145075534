use anyhow::Result;

use crate::api;
use crate::core::AppConfig;

pub async fn run(host: Option<String>, port: Option<u16>, config: AppConfig) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);
    api::serve(host, port, config).await
}
