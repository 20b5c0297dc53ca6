//! HTTP embedding provider and model manager, feature-gated
//! behind `http`. Mirrors the reference endpoints of local model servers.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::EmbeddingProvider;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
}

/// Ensures a named model exists on the provider before first use.
pub struct ModelManager {
    client: reqwest::Client,
    endpoint: String,
}

impl ModelManager {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Lists model names currently available on the provider.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::EmbeddingProvider(format!("GET /api/tags failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::EmbeddingProvider(format!(
                "GET /api/tags returned {}",
                resp.status()
            )));
        }
        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| Error::EmbeddingProvider(format!("malformed /api/tags body: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Issues a blocking pull of `model`, consuming the streamed progress
    /// response to completion. Intermediate progress events are ignored.
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&PullRequest { name: model })
            .send()
            .await
            .map_err(|e| Error::EmbeddingProvider(format!("POST /api/pull failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::EmbeddingProvider(format!(
                "POST /api/pull returned {}",
                resp.status()
            )));
        }
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            chunk.map_err(|e| Error::EmbeddingProvider(format!("pull stream error: {e}")))?;
        }
        Ok(())
    }

    /// Ensures `model` is present, pulling it if `auto_pull` and it is absent.
    pub async fn ensure_model(&self, model: &str, auto_pull: bool) -> Result<()> {
        let available = self.list_models().await?;
        if available.iter().any(|m| m == model) {
            return Ok(());
        }
        if !auto_pull {
            return Err(Error::EmbeddingProvider(format!(
                "model '{model}' not available and auto_pull is disabled"
            )));
        }
        tracing::info!(model, "model absent, issuing blocking pull");
        self.pull_model(model).await
    }
}

/// HTTP-backed embedding provider, POSTing to `/api/embeddings`.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimension: usize, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
        })
    }

    #[must_use]
    pub fn model_manager(&self) -> ModelManager {
        ModelManager::new(self.client.clone(), self.endpoint.clone())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| Error::EmbeddingProvider(format!("POST /api/embeddings failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::EmbeddingProvider(format!(
                "POST /api/embeddings returned {}",
                resp.status()
            )));
        }

        let body: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| Error::EmbeddingProvider(format!("malformed embeddings body: {e}")))?;

        if body.embedding.len() != self.dimension {
            return Err(Error::EmbeddingProvider(format!(
                "provider returned dimension {}, expected {}",
                body.embedding.len(),
                self.dimension
            )));
        }

        Ok(body.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
