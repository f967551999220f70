//! # image-generation-client
//!
//! Text-to-image generation through the Replicate predictions API.
//!
//! A generation is an asynchronous job: [`ImageJobPoller::generate`] submits a prediction,
//! then polls its status until it succeeds, fails, or the deadline passes. HTTP lives behind
//! [`PredictionApi`] ([`ReplicateClient`] in production) so the poll protocol can be driven
//! by a scripted API in tests.
//!
//! ```rust,no_run
//! use image_generation_client::{ImageGenerationClient, ImageGenerator};
//!
//! async fn example() -> Result<(), image_generation_client::GenerationError> {
//!     let client = ImageGenerationClient::replicate("r8_token".to_string());
//!     let url = client.generate("hoooty flying over a city").await?;
//!     println!("{}", url);
//!     Ok(())
//! }
//! ```

mod error;
mod poller;
mod replicate;
mod types;

pub use error::GenerationError;
pub use poller::{
    GenerationJob, ImageGenerationClient, ImageGenerator, ImageJobPoller, PollConfig,
    DEFAULT_DEADLINE, DEFAULT_POLL_INTERVAL,
};
pub use replicate::{PredictionApi, ReplicateClient, DEFAULT_MODEL_VERSION, REPLICATE_API_BASE};
pub use types::{Prediction, PredictionInput, PredictionStatus};

/// Masks an API token for logging: first 7 chars + `***` + last 4 chars.
/// Tokens of length ≤ 11 are fully masked as `***`.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head = token.get(..7).unwrap_or_default();
        let tail = token.get(len - 4..).unwrap_or_default();
        format!("{}***{}", head, tail)
    }
}
