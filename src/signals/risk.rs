//! Risk scoring client

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::features::FeatureSnapshot;

/// Risk scoring collaborator: `score(entity, features) -> risk in [0, 1]`
pub trait RiskScorer: Send + Sync {
    fn score(
        &self,
        entity_id: &str,
        features: &FeatureSnapshot,
    ) -> impl Future<Output = anyhow::Result<f64>> + Send;
}

/// HTTP-backed risk scorer
pub struct HttpRiskScorer {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    entity_id: &'a str,
    features: &'a FeatureSnapshot,
}

#[derive(Deserialize)]
struct ScoreResponse {
    risk: f64,
}

impl HttpRiskScorer {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl RiskScorer for HttpRiskScorer {
    async fn score(&self, entity_id: &str, features: &FeatureSnapshot) -> anyhow::Result<f64> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest {
                entity_id,
                features,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: ScoreResponse = response.json().await?;
        Ok(body.risk)
    }
}
