// check_server.rs
// Probes a running auth service's health endpoint

use anyhow::{bail, Context};
use dotenv::dotenv;
use serde_json::Value;
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let url = format!("http://localhost:{}/health", port);

    println!("Checking {} ...", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("auth service is not reachable at {}", url))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        bail!("auth service answered {} with {}", status, body);
    }

    println!("✅ Auth service is up: {}", body);
    Ok(())
}
