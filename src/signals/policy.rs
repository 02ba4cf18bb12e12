//! Policy model client

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Policy collaborator: `act([risk, count_1m, count_5m]) -> action index`
///
/// The returned index is raw model output; the fusion engine validates it
/// against the action space.
pub trait PolicyModel: Send + Sync {
    fn act(&self, state: [f64; 3]) -> impl Future<Output = anyhow::Result<i64>> + Send;
}

/// HTTP-backed policy model
pub struct HttpPolicyModel {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct ActRequest {
    state: [f64; 3],
}

#[derive(Deserialize)]
struct ActResponse {
    action: i64,
}

impl HttpPolicyModel {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl PolicyModel for HttpPolicyModel {
    async fn act(&self, state: [f64; 3]) -> anyhow::Result<i64> {
        let response = self
            .client
            .post(&self.url)
            .json(&ActRequest { state })
            .send()
            .await?
            .error_for_status()?;

        let body: ActResponse = response.json().await?;
        Ok(body.action)
    }
}
