//! Config handling

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::error::DoodleError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Model endpoint settings, built once at startup and handed to the client.
#[derive(Clone)]
pub struct ModelConfig {
    api_key: String,
    api_base: Url,
    /// Vision model name
    pub recognition_model: String,
    /// Image generation model name
    pub generation_model: String,
}

impl ModelConfig {
    /// Validates and builds the config.
    pub fn new(
        api_key: &str,
        api_base: &str,
        recognition_model: &str,
        generation_model: &str,
    ) -> Result<Self, DoodleError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(DoodleError::Config(
                "GEMINI_API_KEY must be set".to_string(),
            ));
        }
        let mut api_base = Url::parse(api_base.trim())?;
        // Url::join drops the last segment unless the base ends with a slash
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        Ok(Self {
            api_key: api_key.to_string(),
            api_base,
            recognition_model: recognition_model.trim().trim_start_matches("models/").to_string(),
            generation_model: generation_model.trim().trim_start_matches("models/").to_string(),
        })
    }

    /// The API key, for the auth header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// URL for a model method, eg `models/gemini-2.0-flash-exp:generateContent`.
    pub fn model_url(&self, model: &str, method: &str) -> Result<Url, DoodleError> {
        Ok(self.api_base.join(&format!("models/{model}:{method}"))?)
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"[redacted]")
            .field("api_base", &self.api_base.as_str())
            .field("recognition_model", &self.recognition_model)
            .field("generation_model", &self.generation_model)
            .finish()
    }
}

impl TryFrom<&CliOptions> for ModelConfig {
    type Error = DoodleError;

    fn try_from(cli: &CliOptions) -> Result<Self, Self::Error> {
        Self::new(
            &cli.gemini_api_key,
            &cli.api_base,
            &cli.recognition_model,
            &cli.generation_model,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_url_keeps_base_path() {
        let config = ModelConfig::new(
            "secret",
            "https://generativelanguage.googleapis.com/v1beta",
            "models/gemini-2.0-flash-exp",
            "imagen-4.0-generate-preview-06-06",
        )
        .expect("valid config");
        assert_eq!(config.recognition_model, "gemini-2.0-flash-exp");
        let url = config
            .model_url(&config.generation_model, "predict")
            .expect("join url");
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/imagen-4.0-generate-preview-06-06:predict"
        );
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = ModelConfig::new("  ", "https://example.org/", "a", "b");
        assert!(matches!(result, Err(DoodleError::Config(_))));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ModelConfig::new("hunter2", "https://example.org/", "a", "b")
            .expect("valid config");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
