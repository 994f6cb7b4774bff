//! Runs a doodle through decode, recognize, compose and synthesize.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::composer::{PhraseChooser, RandomChooser, compose};
use crate::constants::GENERATED_IMAGES_PATH;
use crate::decoder::decode;
use crate::error::RequestFailed;
use crate::recognizer::Recognizer;
use crate::synthesizer::Synthesizer;

/// Body of a generate request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DrawingRequest {
    /// `<header>,<base64 body>`, as produced by `canvas.toDataURL()`
    pub image: String,
}

/// What we send back for a finished artwork.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ArtResponse {
    /// What the doodle was recognised as
    pub recognition: String,
    /// Prompt sent to the image model
    pub prompt: String,
    /// Where the artwork can be fetched from
    pub image_url: String,
    /// Artwork filename
    pub filename: String,
}

/// One pipeline, shared by every request.
#[derive(Clone)]
pub struct Pipeline {
    recognizer: Recognizer,
    synthesizer: Synthesizer,
    chooser: Arc<dyn PhraseChooser>,
}

impl Pipeline {
    /// Pipeline with uniform random style and mood picks.
    pub fn new(recognizer: Recognizer, synthesizer: Synthesizer) -> Self {
        Self::with_chooser(recognizer, synthesizer, Arc::new(RandomChooser))
    }

    /// Pipeline with a caller supplied phrase chooser.
    pub fn with_chooser(
        recognizer: Recognizer,
        synthesizer: Synthesizer,
        chooser: Arc<dyn PhraseChooser>,
    ) -> Self {
        Self {
            recognizer,
            synthesizer,
            chooser,
        }
    }

    /// The synthesizer, for its output directory.
    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Handles one drawing end to end. The original doodle always goes along as
    /// the reference image.
    #[instrument(skip_all)]
    pub async fn handle(&self, encoded: &str) -> Result<ArtResponse, RequestFailed> {
        let image = decode(encoded)?;

        let recognition = self.recognizer.recognize(&image).await;
        info!("Recognized: {}", recognition.label);

        let prompt = compose(&recognition.label, self.chooser.as_ref());
        info!("Enhanced prompt: {}", prompt);

        let artifact = self.synthesizer.synthesize(&prompt, Some(&image)).await?;

        Ok(ArtResponse {
            recognition: recognition.label,
            prompt: prompt.text,
            image_url: format!("{GENERATED_IMAGES_PATH}/{}", artifact.filename),
            filename: artifact.filename,
        })
    }
}
