//! Wire types for the Replicate predictions API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Denoising steps sent with every prediction.
pub const NUM_INFERENCE_STEPS: u32 = 30;
/// Classifier-free guidance scale sent with every prediction.
pub const GUIDANCE_SCALE: f64 = 7.5;
/// Output width and height in pixels.
pub const IMAGE_SIZE: u32 = 1024;

/// `input` object of a create-prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub width: u32,
    pub height: u32,
}

impl PredictionInput {
    /// Builds an input with the fixed generation parameters (30 steps, guidance 7.5, 1024×1024).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            num_inference_steps: NUM_INFERENCE_STEPS,
            guidance_scale: GUIDANCE_SCALE,
            width: IMAGE_SIZE,
            height: IMAGE_SIZE,
        }
    }
}

/// Prediction lifecycle as seen by the poller. Anything that is not `succeeded` or `failed`
/// (`starting`, `processing`, `canceled`, unknown values) counts as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Succeeded,
    Failed,
    #[default]
    #[serde(other)]
    Pending,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PredictionStatus::Pending)
    }
}

/// Prediction object returned by both create and get.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Prediction {
    /// First output reference: the first element of the `output` list, or the value itself
    /// when a model returns a single string. Empty strings count as absent.
    pub fn first_output(&self) -> Option<String> {
        let first = match self.output.as_ref()? {
            Value::Array(items) => items.first()?,
            other => other,
        };
        first
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Error text reported by the service, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
