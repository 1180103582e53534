use std::{sync::Arc, time::Duration};

use apiclient::{ApiClient, ApiRequest, DebugSink};

struct StdoutSink;

impl DebugSink for StdoutSink {
    fn line(&self, line: &str) {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        std::env::var("APICLIENT_BASE_URL").unwrap_or_else(|_| "https://api.example.com".into());

    let client =
        ApiClient::new(base_url, true, 3, Duration::from_secs(2)).with_sink(Arc::new(StdoutSink));

    let request = ApiRequest::get("/data").header("Content-Type", "application/json");
    let response = client.send_request(&request).await?;

    println!("Response: {}", response.text());

    Ok(())
}
