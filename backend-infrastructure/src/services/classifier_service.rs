use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use backend_domain::{Classifier, ClassifierVerdict, Transaction};

#[derive(Debug, Deserialize)]
struct AssessResponse {
    confidence: Option<f64>,
}

/// Posts the transaction JSON to an external scoring service.
/// `204 No Content` or a null confidence means no opinion.
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn assess(&self, transaction: &Transaction) -> Result<Option<ClassifierVerdict>> {
        let response = self
            .client
            .post(&self.url)
            .json(transaction)
            .send()
            .await?
            .error_for_status()?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body: AssessResponse = response.json().await?;
        Ok(body.confidence.map(|confidence| ClassifierVerdict { confidence }))
    }

    async fn ping(&self) -> Result<()> {
        let response = self.client.get(&self.url).send().await?;
        if response.status().is_server_error() {
            anyhow::bail!("classifier responded {}", response.status());
        }
        Ok(())
    }
}
