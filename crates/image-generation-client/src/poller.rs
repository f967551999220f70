//! Submit-then-poll protocol over a [`PredictionApi`].
//!
//! The deadline is an elapsed-time comparison against the instant captured just before the
//! creation request, checked before every status request.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::GenerationError;
use crate::replicate::{PredictionApi, ReplicateClient};
use crate::types::{PredictionInput, PredictionStatus};

/// Wait between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);
/// Give up on a prediction this long after submission.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(540_000);

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

/// One submitted prediction; lives only while its command is being handled.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: String,
    pub prompt: String,
    pub submitted_at: Instant,
}

impl GenerationJob {
    pub fn elapsed(&self) -> Duration {
        self.submitted_at.elapsed()
    }
}

/// Something that turns a prompt into an image URL.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Runs the prediction protocol against `A`.
#[derive(Debug, Clone)]
pub struct ImageJobPoller<A> {
    api: A,
    config: PollConfig,
}

/// Poller backed by the Replicate HTTP API.
pub type ImageGenerationClient = ImageJobPoller<ReplicateClient>;

impl ImageJobPoller<ReplicateClient> {
    /// Replicate client with default base URL, model version and poll timing.
    pub fn replicate(api_token: String) -> Self {
        Self::new(ReplicateClient::new(api_token))
    }
}

impl<A: PredictionApi> ImageJobPoller<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    pub fn with_config(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Creates the prediction. A response without an id is [`GenerationError::SubmissionFailed`].
    pub async fn submit(&self, prompt: &str) -> Result<GenerationJob, GenerationError> {
        let submitted_at = Instant::now();
        let input = PredictionInput::new(prompt);
        let prediction = self.api.create(&input).await?;

        let id = prediction
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                warn!("Create prediction response has no id");
                GenerationError::SubmissionFailed("response has no prediction id".to_string())
            })?;

        info!(job_id = %id, "step: prediction submitted");
        Ok(GenerationJob {
            id,
            prompt: prompt.to_string(),
            submitted_at,
        })
    }

    /// Polls `job` until it succeeds, fails, or the deadline passes.
    pub async fn wait(&self, job: &GenerationJob) -> Result<String, GenerationError> {
        let mut polls: u32 = 0;
        loop {
            let elapsed = job.elapsed();
            if elapsed > self.config.deadline {
                warn!(
                    job_id = %job.id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    polls,
                    "Prediction timed out"
                );
                return Err(GenerationError::JobTimedOut(self.config.deadline));
            }

            let prediction = self.api.get(&job.id).await?;
            polls += 1;

            match prediction.status {
                PredictionStatus::Succeeded => {
                    let url = prediction.first_output().ok_or_else(|| {
                        warn!(job_id = %job.id, "Prediction succeeded without output");
                        GenerationError::EmptyResult
                    })?;
                    info!(
                        job_id = %job.id,
                        elapsed_ms = job.elapsed().as_millis() as u64,
                        polls,
                        image_url = %url,
                        "step: prediction succeeded"
                    );
                    return Ok(url);
                }
                PredictionStatus::Failed => {
                    let reason = prediction
                        .error_message()
                        .unwrap_or_else(|| "no error detail".to_string());
                    warn!(job_id = %job.id, error = %reason, "Prediction failed");
                    return Err(GenerationError::JobFailed(reason));
                }
                PredictionStatus::Pending => {
                    debug!(job_id = %job.id, polls, "Prediction pending");
                    tokio::time::sleep(self.config.interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl<A: PredictionApi> ImageGenerator for ImageJobPoller<A> {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let job = self.submit(prompt).await?;
        self.wait(&job).await
    }
}
