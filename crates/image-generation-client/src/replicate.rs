//! HTTP side of the prediction protocol: [`PredictionApi`] and its Replicate implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::error::GenerationError;
use crate::mask_token;
use crate::types::{Prediction, PredictionInput};

/// Default Replicate API base URL.
pub const REPLICATE_API_BASE: &str = "https://api.replicate.com/v1";

/// Model version used for Hooty images.
pub const DEFAULT_MODEL_VERSION: &str =
    "db21e45a3f183e8600d17d7e8917f4a7c19cc7f38e38f8c69c8b27c8de2bff13";

/// Create and read predictions. One call per method; no retries.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Creates a prediction for `input`. Rejected or unreadable responses are
    /// [`GenerationError::SubmissionFailed`].
    async fn create(&self, input: &PredictionInput) -> Result<Prediction, GenerationError>;

    /// Reads the current state of prediction `id`.
    async fn get(&self, id: &str) -> Result<Prediction, GenerationError>;
}

#[async_trait]
impl<T: PredictionApi + ?Sized> PredictionApi for std::sync::Arc<T> {
    async fn create(&self, input: &PredictionInput) -> Result<Prediction, GenerationError> {
        (**self).create(input).await
    }

    async fn get(&self, id: &str) -> Result<Prediction, GenerationError> {
        (**self).get(id).await
    }
}

#[derive(Debug, Serialize)]
struct CreatePredictionRequest<'a> {
    version: &'a str,
    input: &'a PredictionInput,
}

/// Replicate predictions client (bearer-token auth).
#[derive(Debug, Clone)]
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    api_token: String,
    model_version: String,
}

impl ReplicateClient {
    /// Creates a client for the public Replicate API with the default model version.
    pub fn new(api_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: REPLICATE_API_BASE.to_string(),
            api_token,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
        }
    }

    /// Uses a different API base URL (trailing `/` is ignored).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Uses a different model version.
    pub fn with_model_version(mut self, model_version: String) -> Self {
        self.model_version = model_version;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.base_url)
    }
}

#[async_trait]
impl PredictionApi for ReplicateClient {
    #[instrument(skip(self, input))]
    async fn create(&self, input: &PredictionInput) -> Result<Prediction, GenerationError> {
        info!(
            version = %self.model_version,
            prompt_preview = %input.prompt.chars().take(100).collect::<String>(),
            api_token = %mask_token(&self.api_token),
            "step: Replicate create prediction request"
        );

        let request = CreatePredictionRequest {
            version: &self.model_version,
            input,
        };

        let response = self
            .client
            .post(self.predictions_url())
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Error creating prediction");
            return Err(GenerationError::SubmissionFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str::<Prediction>(&body).map_err(|e| {
            error!(error = %e, body = %body, "Unreadable create prediction response");
            GenerationError::SubmissionFailed(format!("invalid response: {}", e))
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Prediction, GenerationError> {
        let response = self
            .client
            .get(format!("{}/{}", self.predictions_url(), id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let prediction: Prediction = response.json().await?;
        debug!(job_id = %id, status = ?prediction.status, "step: Replicate prediction status");
        Ok(prediction)
    }
}
