//! Errors returned by image generation.

use std::time::Duration;
use thiserror::Error;

/// Why a generation did not produce an image URL.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The creation call did not yield a prediction id (rejected or malformed request).
    #[error("Failed to start image generation: {0}")]
    SubmissionFailed(String),

    /// The service reported the prediction as failed.
    #[error("Image generation failed: {0}")]
    JobFailed(String),

    /// The prediction did not reach a terminal state before the deadline.
    #[error("Image generation timed out after {0:?}")]
    JobTimedOut(Duration),

    /// The prediction succeeded but carried no output.
    #[error("No image returned")]
    EmptyResult,

    /// Non-2xx response while polling a prediction.
    #[error("Replicate API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Network or decoding failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
