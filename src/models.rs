//! Seams for the external model providers.

use std::future::Future;
use std::pin::Pin;

use crate::decoder::RasterImage;

/// Boxed future returned by the model traits.
pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// A vision-language model that answers a text instruction about an image.
pub trait VisionModel: Send + Sync {
    /// Returns the model's free-form text reply.
    fn describe<'a>(&'a self, instruction: &'a str, image: &'a RasterImage)
    -> ModelFuture<'a, String>;
}

/// What we ask the image model for.
#[derive(Clone, Debug)]
pub struct GenerationRequest<'a> {
    /// Text prompt
    pub prompt: &'a str,
    /// Image used to steer composition/style
    pub reference: Option<&'a RasterImage>,
    /// How many images we want back
    pub count: u8,
    /// eg `image/jpeg`
    pub mime_type: &'a str,
    /// eg `1:1`
    pub aspect_ratio: &'a str,
    /// Content policy for people in the output
    pub person_generation: &'a str,
}

/// An image generation model.
pub trait ImageGenerator: Send + Sync {
    /// Returns the encoded bytes of every image the model produced.
    fn generate<'a>(&'a self, request: &'a GenerationRequest<'a>) -> ModelFuture<'a, Vec<Vec<u8>>>;
}
