//! Paints the artwork and stores it on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::composer::GenerationPrompt;
use crate::constants::{
    ARTIFACT_JPEG_QUALITY, ARTIFACT_NAME_ATTEMPTS, ARTIFACT_PREFIX, ARTIFACT_TIMESTAMP_FORMAT,
    GENERATION_ASPECT_RATIO, GENERATION_MIME_TYPE, GENERATION_PERSON_POLICY,
};
use crate::decoder::RasterImage;
use crate::error::DoodleError;
use crate::models::{GenerationRequest, ImageGenerator};

/// A generated image that has been written to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Where it was written
    pub path: PathBuf,
    /// Just the filename, eg `doodle_art_20250101_120000.jpg`
    pub filename: String,
}

/// Artifact filename for a given moment.
pub fn artifact_filename(at: &DateTime<Local>) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}.jpg",
        at.format(ARTIFACT_TIMESTAMP_FORMAT)
    )
}

/// Calls the image model and persists its single output.
#[derive(Clone)]
pub struct Synthesizer {
    generator: Arc<dyn ImageGenerator>,
    output_dir: PathBuf,
}

impl Synthesizer {
    /// New synthesizer writing into `output_dir`.
    pub fn new(generator: Arc<dyn ImageGenerator>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
        }
    }

    /// Where artifacts end up.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generates exactly one image for `prompt`, steered by `reference` if given.
    ///
    /// Nothing is written unless the model returned exactly one decodable image.
    pub async fn synthesize(
        &self,
        prompt: &GenerationPrompt,
        reference: Option<&RasterImage>,
    ) -> Result<GeneratedArtifact, DoodleError> {
        let request = GenerationRequest {
            prompt: &prompt.text,
            reference,
            count: 1,
            mime_type: GENERATION_MIME_TYPE,
            aspect_ratio: GENERATION_ASPECT_RATIO,
            person_generation: GENERATION_PERSON_POLICY,
        };

        let mut images = self.generator.generate(&request).await.map_err(|err| {
            error!("Error generating image: {:#}", err);
            DoodleError::GenerationFailed(format!("{err:#}"))
        })?;

        let bytes = match images.len() {
            0 => {
                return Err(DoodleError::GenerationFailed(
                    "No images generated".to_string(),
                ));
            }
            1 => images.remove(0),
            count => {
                return Err(DoodleError::GenerationFailed(format!(
                    "Unexpected number of images generated: {count}"
                )));
            }
        };

        let image = image::load_from_memory(&bytes).map_err(|err| {
            DoodleError::GenerationFailed(format!("generated image could not be decoded: {err}"))
        })?;
        let jpeg = encode_jpeg(&image)?;

        let artifact = self.store(&jpeg, Local::now()).await?;
        info!(
            "Saved {}x{} artifact to {}",
            image.width(),
            image.height(),
            artifact.path.display()
        );
        Ok(artifact)
    }

    /// Writes the bytes under the first free timestamped name at or after `now`.
    async fn store(
        &self,
        bytes: &[u8],
        now: DateTime<Local>,
    ) -> Result<GeneratedArtifact, DoodleError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|err| DoodleError::GenerationFailed(err.to_string()))?;

        for offset in 0..ARTIFACT_NAME_ATTEMPTS {
            let filename = artifact_filename(&(now + TimeDelta::seconds(i64::from(offset))));
            let path = self.output_dir.join(&filename);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, trying the next second", filename);
                    continue;
                }
                Err(err) => return Err(DoodleError::GenerationFailed(err.to_string())),
            };

            let written = async {
                file.write_all(bytes).await?;
                file.flush().await
            }
            .await;
            if let Err(err) = written {
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    error!(
                        "Failed to clean up partial artifact {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                return Err(DoodleError::GenerationFailed(err.to_string()));
            }
            return Ok(GeneratedArtifact { path, filename });
        }

        Err(DoodleError::GenerationFailed(format!(
            "no free artifact filename within {ARTIFACT_NAME_ATTEMPTS} seconds of {}",
            artifact_filename(&now)
        )))
    }
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, DoodleError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut output = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut output,
        ARTIFACT_JPEG_QUALITY,
    ))
    .map_err(|err| DoodleError::GenerationFailed(err.to_string()))?;
    Ok(output)
}
