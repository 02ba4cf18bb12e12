//! Explanation client

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::features::FeatureSnapshot;
use crate::fusion::Action;

/// Substituted when the explainer fails or times out
pub const EXPLANATION_PLACEHOLDER: &str = "explanation unavailable";

/// Explanation collaborator, best-effort
pub trait Explainer: Send + Sync {
    fn explain(
        &self,
        entity_id: &str,
        risk: f64,
        action: Action,
        features: &FeatureSnapshot,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// HTTP-backed explainer
pub struct HttpExplainer {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    entity_id: &'a str,
    risk: f64,
    action: i16,
    features: &'a FeatureSnapshot,
}

#[derive(Deserialize)]
struct ExplainResponse {
    explanation: String,
}

impl HttpExplainer {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl Explainer for HttpExplainer {
    async fn explain(
        &self,
        entity_id: &str,
        risk: f64,
        action: Action,
        features: &FeatureSnapshot,
    ) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&ExplainRequest {
                entity_id,
                risk,
                action: action.index(),
                features,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: ExplainResponse = response.json().await?;
        Ok(body.explanation)
    }
}
