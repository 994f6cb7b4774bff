//! Gemini (vision) and Imagen (generation) over the Generative Language REST API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::ModelConfig;
use crate::constants::MODEL_REQUEST_TIMEOUT_SECONDS;
use crate::decoder::RasterImage;
use crate::models::{GenerationRequest, ImageGenerator, ModelFuture, VisionModel};

const API_KEY_HEADER: &str = "x-goog-api-key";

// -----------------------------
// generateContent (vision)
// -----------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        Some(text)
    }
}

// -----------------------------
// predict (Imagen)
// -----------------------------

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn predict_payload(request: &GenerationRequest<'_>) -> Value {
    let mut instance = Map::new();
    instance.insert("prompt".to_string(), json!(request.prompt));
    if let Some(reference) = request.reference {
        instance.insert(
            "referenceImages".to_string(),
            json!([{
                "referenceId": 1,
                "referenceType": "REFERENCE_TYPE_RAW",
                "referenceImage": {
                    "bytesBase64Encoded": general_purpose::STANDARD.encode(reference.png()),
                    "mimeType": "image/png",
                }
            }]),
        );
    }

    json!({
        "instances": [Value::Object(instance)],
        "parameters": {
            "sampleCount": request.count,
            "aspectRatio": request.aspect_ratio,
            "personGeneration": request.person_generation,
            "outputOptions": { "mimeType": request.mime_type },
        }
    })
}

fn vision_payload(instruction: &str, png: &[u8]) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": instruction },
                {
                    "inlineData": {
                        "mimeType": "image/png",
                        "data": general_purpose::STANDARD.encode(png),
                    }
                }
            ]
        }]
    })
}

fn decode_predictions(response: PredictResponse) -> Result<Vec<Vec<u8>>> {
    response
        .predictions
        .into_iter()
        .filter_map(|prediction| {
            if let Some(mime_type) = prediction.mime_type.as_deref() {
                debug!("Imagen returned {}", mime_type);
            }
            prediction.bytes_base64_encoded
        })
        .map(|encoded| {
            general_purpose::STANDARD
                .decode(encoded)
                .context("Failed to base64-decode generated image")
        })
        .collect()
}

/// Client for both model endpoints. Cheap to clone.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl GeminiClient {
    /// Builds the HTTP client once; the config is fixed from here on.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(MODEL_REQUEST_TIMEOUT_SECONDS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        model: &str,
        method: &str,
        payload: &Value,
    ) -> Result<T> {
        let url = self
            .config
            .model_url(model, method)
            .map_err(|err| anyhow!("{err}"))?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Request to {model}:{method} failed"))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("Failed reading {model}:{method} body"))?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(anyhow!("{model}:{method} returned {status}: {message}"));
        }

        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {model}:{method} JSON"))
    }
}

impl VisionModel for GeminiClient {
    fn describe<'a>(
        &'a self,
        instruction: &'a str,
        image: &'a RasterImage,
    ) -> ModelFuture<'a, String> {
        Box::pin(async move {
            let response: GenerateContentResponse = self
                .post(
                    &self.config.recognition_model,
                    "generateContent",
                    &vision_payload(instruction, image.png()),
                )
                .await?;
            response
                .text()
                .ok_or_else(|| anyhow!("Vision model returned no candidates"))
        })
    }
}

impl ImageGenerator for GeminiClient {
    fn generate<'a>(&'a self, request: &'a GenerationRequest<'a>) -> ModelFuture<'a, Vec<Vec<u8>>> {
        Box::pin(async move {
            let payload = predict_payload(request);
            let response: PredictResponse = self
                .post(&self.config.generation_model, "predict", &payload)
                .await?;
            decode_predictions(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RECOGNITION_PROMPT;
    use image::{DynamicImage, RgbImage};

    fn request<'a>(reference: Option<&'a RasterImage>) -> GenerationRequest<'a> {
        GenerationRequest {
            prompt: "A cat, dreamy watercolor, warm and cozy, professional quality, highly detailed",
            reference,
            count: 1,
            mime_type: "image/jpeg",
            aspect_ratio: "1:1",
            person_generation: "allow_adult",
        }
    }

    #[test]
    fn predict_payload_without_reference() {
        let payload = predict_payload(&request(None));
        assert_eq!(payload["parameters"]["sampleCount"], 1);
        assert_eq!(payload["parameters"]["aspectRatio"], "1:1");
        assert_eq!(payload["parameters"]["personGeneration"], "allow_adult");
        assert_eq!(
            payload["parameters"]["outputOptions"]["mimeType"],
            "image/jpeg"
        );
        assert!(payload["instances"][0].get("referenceImages").is_none());
    }

    #[test]
    fn predict_payload_embeds_reference_as_png() {
        let doodle = RasterImage::new(DynamicImage::ImageRgb8(RgbImage::new(2, 2)), None)
            .expect("raster");
        let payload = predict_payload(&request(Some(&doodle)));
        let encoded = payload["instances"][0]["referenceImages"][0]["referenceImage"]
            ["bytesBase64Encoded"]
            .as_str()
            .expect("reference bytes");
        let bytes = general_purpose::STANDARD.decode(encoded).expect("base64");
        assert_eq!(
            image::guess_format(&bytes).expect("format"),
            image::ImageFormat::Png
        );
    }

    #[test]
    fn both_models_receive_the_same_png_bytes() {
        let doodle = RasterImage::new(DynamicImage::ImageRgb8(RgbImage::new(3, 2)), None)
            .expect("raster");
        let expected = general_purpose::STANDARD.encode(doodle.png());

        let vision = vision_payload(RECOGNITION_PROMPT, doodle.png());
        assert_eq!(
            vision["contents"][0]["parts"][1]["inlineData"]["data"],
            expected.as_str()
        );

        let predict = predict_payload(&request(Some(&doodle)));
        assert_eq!(
            predict["instances"][0]["referenceImages"][0]["referenceImage"]["bytesBase64Encoded"],
            expected.as_str()
        );
    }

    #[test]
    fn vision_reply_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "ca"}, {"text": "t\n"}]}},
                {"content": {"parts": [{"text": "dog"}]}}
            ]
        }))
        .expect("parse");
        assert_eq!(response.text().as_deref(), Some("cat\n"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({})).expect("parse");
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn predictions_are_base64_decoded() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [
                {"bytesBase64Encoded": general_purpose::STANDARD.encode(b"one"), "mimeType": "image/jpeg"},
                {"raiFilteredReason": "filtered"}
            ]
        }))
        .expect("parse");
        assert_eq!(decode_predictions(response).expect("decode"), vec![b"one".to_vec()]);

        let bad: PredictResponse = serde_json::from_value(json!({
            "predictions": [{"bytesBase64Encoded": "***"}]
        }))
        .expect("parse");
        assert!(decode_predictions(bad).is_err());
    }
}
