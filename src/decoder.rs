//! Turns the data-URL payload sent by the browser into a decoded image.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose;
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use crate::error::DoodleError;

/// A decoded doodle, held for the length of one request.
///
/// The PNG the models receive is encoded once, when the image is wrapped.
#[derive(Clone, Debug)]
pub struct RasterImage {
    image: DynamicImage,
    format: Option<ImageFormat>,
    png: Vec<u8>,
}

impl RasterImage {
    /// Wraps an already-decoded image and encodes its PNG copy.
    pub fn new(image: DynamicImage, format: Option<ImageFormat>) -> Result<Self, image::ImageError> {
        let mut output = Cursor::new(Vec::new());
        image.write_to(&mut output, ImageFormat::Png)?;
        Ok(Self {
            image,
            format,
            png: output.into_inner(),
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The format the bytes were in, if it could be guessed.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// The pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// PNG encoding of the image, which is what we hand to the models.
    pub fn png(&self) -> &[u8] {
        &self.png
    }
}

/// Decodes a `<header>,<base64 body>` payload, eg `data:image/png;base64,iVBOR...`.
///
/// Only the body is looked at; the header is whatever came before the first comma.
/// Whitespace inside the body (line-wrapped base64) is ignored.
pub fn decode(encoded: &str) -> Result<RasterImage, DoodleError> {
    let Some((_header, body)) = encoded.split_once(',') else {
        return Err(DoodleError::MalformedInput(
            "expected a header and base64 body separated by a comma".to_string(),
        ));
    };

    let body: String = body.split_ascii_whitespace().collect();
    let bytes = general_purpose::STANDARD
        .decode(body)
        .map_err(|err| DoodleError::MalformedInput(format!("invalid base64 body: {err}")))?;

    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|err| DoodleError::UnsupportedImageFormat(err.to_string()))?;
    let format = reader.format();
    if format.is_none() {
        return Err(DoodleError::UnsupportedImageFormat(
            "could not determine the image format".to_string(),
        ));
    }
    let image = reader.decode().map_err(|err| {
        debug!("Failed to decode image: {}", err);
        DoodleError::UnsupportedImageFormat(err.to_string())
    })?;

    debug!(
        "Decoded {:?} doodle, {}x{}",
        format,
        image.width(),
        image.height()
    );
    RasterImage::new(image, format)
        .map_err(|err| DoodleError::UnsupportedImageFormat(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_data_url(width: u32, height: u32) -> String {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        let raster = RasterImage::new(image, None).expect("encode png");
        let png = raster.png();
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(png)
        )
    }

    #[test]
    fn decodes_png_data_url() {
        let raster = decode(&png_data_url(3, 2)).expect("decode");
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn png_round_trip_preserves_dimensions_and_pixels() {
        let raster = decode(&png_data_url(4, 5)).expect("decode");
        let again = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(raster.png())
        );
        let second = decode(&again).expect("decode again");
        assert_eq!(second.width(), 4);
        assert_eq!(second.height(), 5);
        assert_eq!(second.image().to_rgb8(), raster.image().to_rgb8());
    }

    #[test]
    fn missing_separator_is_malformed() {
        assert!(matches!(
            decode("data:image/png;base64"),
            Err(DoodleError::MalformedInput(_))
        ));
        assert!(matches!(decode(""), Err(DoodleError::MalformedInput(_))));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        assert!(matches!(
            decode("data:image/png;base64,not*base64!"),
            Err(DoodleError::MalformedInput(_))
        ));
    }

    #[test]
    fn non_image_bytes_are_unsupported() {
        let body = general_purpose::STANDARD.encode(b"This is not an image file.");
        assert!(matches!(
            decode(&format!("data:image/png;base64,{body}")),
            Err(DoodleError::UnsupportedImageFormat(_))
        ));
        assert!(matches!(
            decode("data:image/png;base64,"),
            Err(DoodleError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn truncated_png_is_unsupported() {
        let url = png_data_url(2, 2);
        let (_, body) = url.split_once(',').expect("separator");
        let mut bytes = general_purpose::STANDARD.decode(body).expect("base64");
        bytes.truncate(20);
        let encoded = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(bytes)
        );
        assert!(matches!(
            decode(&encoded),
            Err(DoodleError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn decodes_gif_bmp_and_webp() {
        let gif = decode("data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///ywAAAAAAQABAAACAUwAOw==")
            .expect("decode gif");
        assert_eq!((gif.width(), gif.height()), (1, 1));
        assert_eq!(gif.format(), Some(ImageFormat::Gif));

        for format in [ImageFormat::Bmp, ImageFormat::WebP] {
            let mut bytes = Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(image::RgbaImage::new(2, 3))
                .write_to(&mut bytes, format)
                .expect("encode");
            let url = format!(
                "data:image/*;base64,{}",
                general_purpose::STANDARD.encode(bytes.into_inner())
            );
            let raster = decode(&url).expect("decode");
            assert_eq!((raster.width(), raster.height()), (2, 3));
            assert_eq!(raster.format(), Some(format));
        }
    }

    #[test]
    fn line_wrapped_base64_is_accepted() {
        let url = png_data_url(2, 2);
        let (header, body) = url.split_once(',').expect("separator");
        let wrapped = body
            .as_bytes()
            .chunks(20)
            .map(|chunk| std::str::from_utf8(chunk).expect("ascii"))
            .collect::<Vec<_>>()
            .join("\r\n");
        let raster = decode(&format!("{header},\n{wrapped}\n")).expect("decode");
        assert_eq!((raster.width(), raster.height()), (2, 2));
    }

    #[test]
    fn png_copy_decodes_to_same_pixels() {
        let raster = decode(&png_data_url(3, 3)).expect("decode");
        let again = image::load_from_memory(raster.png()).expect("png copy");
        assert_eq!(again.to_rgb8(), raster.image().to_rgb8());
    }
}
