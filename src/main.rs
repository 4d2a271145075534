use anyhow::Result;
use azchat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
