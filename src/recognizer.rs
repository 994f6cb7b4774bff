//! Asks the vision model what the doodle is.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::{DEFAULT_LABEL, RECOGNITION_PROMPT};
use crate::decoder::RasterImage;
use crate::error::RecognitionDegraded;
use crate::models::VisionModel;

/// Outcome of recognition. Always carries a usable label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recognition {
    /// What the doodle shows, eg `cat`
    pub label: String,
    /// Set when the model failed and [`DEFAULT_LABEL`] was substituted
    pub degraded: Option<RecognitionDegraded>,
}

impl Recognition {
    fn recognized(label: String) -> Self {
        Self {
            label,
            degraded: None,
        }
    }

    fn fallback(reason: RecognitionDegraded) -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            degraded: Some(reason),
        }
    }

    /// True if the default label stands in for a real answer.
    pub fn is_fallback(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Wraps a [`VisionModel`] with the fixed recognition instructions.
#[derive(Clone)]
pub struct Recognizer {
    model: Arc<dyn VisionModel>,
}

impl Recognizer {
    /// New recognizer over the given model.
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Never fails: any model error or empty reply yields [`DEFAULT_LABEL`].
    pub async fn recognize(&self, image: &RasterImage) -> Recognition {
        match self.model.describe(RECOGNITION_PROMPT, image).await {
            Ok(text) => {
                let label = text.trim();
                if label.is_empty() {
                    warn!("Vision model returned an empty reply, using default label");
                    Recognition::fallback(RecognitionDegraded("empty response".to_string()))
                } else {
                    debug!("Vision model replied: {}", label);
                    Recognition::recognized(label.to_string())
                }
            }
            Err(err) => {
                warn!("Error in recognition: {:#}", err);
                Recognition::fallback(RecognitionDegraded(format!("{err:#}")))
            }
        }
    }
}
