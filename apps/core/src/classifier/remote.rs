//! Classifier that delegates to an external HTTP endpoint.
//!
//! One `POST` per complaint, no retries. The endpoint answers either with an
//! analysis or with `{"error": "..."}`; the latter is always surfaced as a
//! failure rather than replaced by a default analysis.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use super::ClassificationError;
use crate::models::{AnalysisResult, City};
use crate::traits::Classifier;

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    complaint: &'a str,
    city: Option<&'static str>,
}

/// Thin proxy to a remote classification service.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: Client,
    endpoint: Url,
    auth_token: Option<String>,
}

impl RemoteClassifier {
    pub fn new(
        endpoint: Url,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassificationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            auth_token,
        })
    }

    fn build_request(&self, payload: &ClassifyRequest<'_>) -> Result<reqwest::RequestBuilder, ClassificationError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let auth_value = format!("Bearer {}", token)
                .parse()
                .map_err(|_| ClassificationError::Malformed("auth token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(self
            .client
            .post(self.endpoint.clone())
            .headers(headers)
            .json(payload))
    }
}

/// Pulls the `error` field out of a response body, if there is one.
fn error_message(body: &Value) -> Option<String> {
    body.get("error").and_then(Value::as_str).map(str::to_string)
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(
        &self,
        text: &str,
        city: Option<City>,
    ) -> Result<AnalysisResult, ClassificationError> {
        let payload = ClassifyRequest {
            complaint: text,
            city: city.map(|c| c.label()),
        };

        info!(endpoint = %self.endpoint, "Requesting remote classification");

        let res = self.build_request(&payload)?.send().await?;
        let status = res.status();
        let raw = res.text().await?;
        let body: Option<Value> = serde_json::from_str(&raw).ok();

        if let Some(message) = body.as_ref().and_then(error_message) {
            error!(status = status.as_u16(), "Remote classifier rejected complaint: {}", message);
            return Err(ClassificationError::Rejected(message));
        }

        if !status.is_success() {
            return Err(ClassificationError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let body = body.ok_or_else(|| ClassificationError::Malformed(format!("not JSON: {}", raw)))?;
        serde_json::from_value(body).map_err(|e| ClassificationError::Malformed(e.to_string()))
    }
}
