//! Calls httpbin over plain HTTP: reqwest is built without a TLS backend.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snooze_core::{Client, SnoozeError, service};
use tracing::info;

#[service]
trait HttpBin {
    #[endpoint(path = "/anything/{0}", method = "GET")]
    async fn anything(&self, name: &str) -> Result<Echo, SnoozeError>;

    #[endpoint(path = "/post", method = "POST")]
    async fn post(&self, dog: &Dog) -> Result<Echo, SnoozeError>;
}

#[derive(Debug, Serialize)]
struct Dog {
    name: String,
    breed: String,
}

#[derive(Debug, Default, Deserialize)]
struct Echo {
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    json: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let client = Client::builder()
        .with_root("http://httpbin.org")
        .with_before_send(|_request, config| {
            config.configure(|builder| builder.timeout(Duration::from_secs(10)));
        })
        .with_error_for_status(true)
        .build()?;
    let bin = HttpBinClient::new(client);

    let echo = bin.anything("hound").await?;
    info!(url = %echo.url, headers = ?echo.headers, "GET");

    let dog = Dog {
        name: "Rex".to_string(),
        breed: "hound".to_string(),
    };
    let echo = bin.post(&dog).await?;
    info!(url = %echo.url, json = ?echo.json, "POST");

    Ok(())
}
