//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "DOODLEART_DEBUG")]
    /// Enable debug logging. Env: DOODLEART_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "8000", env = "DOODLEART_PORT")]
    /// http listener, defaults to `8000`.
    /// Env: DOODLEART_PORT
    pub port: NonZeroU16,
    #[clap(long, short, default_value = "0.0.0.0", env = "DOODLEART_LISTEN_ADDRESS")]
    /// Listen address, defaults to `0.0.0.0`.
    /// Env: DOODLEART_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    /// API key for the Gemini/Imagen endpoints.
    /// Env: GEMINI_API_KEY
    pub gemini_api_key: String,

    #[clap(
        long,
        default_value = "https://generativelanguage.googleapis.com/v1beta/",
        env = "DOODLEART_API_BASE"
    )]
    /// Base URL of the model API.
    /// Env: DOODLEART_API_BASE
    pub api_base: String,

    #[clap(
        long,
        default_value = "gemini-2.0-flash-exp",
        env = "DOODLEART_RECOGNITION_MODEL"
    )]
    /// Vision model used to recognise doodles.
    /// Env: DOODLEART_RECOGNITION_MODEL
    pub recognition_model: String,

    #[clap(
        long,
        default_value = "imagen-4.0-generate-preview-06-06",
        env = "DOODLEART_GENERATION_MODEL"
    )]
    /// Image model used to paint the artwork.
    /// Env: DOODLEART_GENERATION_MODEL
    pub generation_model: String,

    #[clap(
        long,
        short,
        default_value = "./generated_images",
        env = "DOODLEART_OUTPUT_DIR"
    )]
    /// Where generated images are written, eg `/data/generated_images`.
    /// Env: DOODLEART_OUTPUT_DIR
    pub output_dir: PathBuf,
}
