use std::sync::Arc;

use clap::Parser;
use doodleart::config::{ModelConfig, setup_logging};
use doodleart::gemini::GeminiClient;
use doodleart::pipeline::Pipeline;
use doodleart::recognizer::Recognizer;
use doodleart::synthesizer::Synthesizer;
use tracing::{error, info};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = doodleart::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = match ModelConfig::try_from(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return;
        }
    };
    info!(
        "Using {} for recognition and {} for generation",
        config.recognition_model, config.generation_model
    );

    if let Err(err) = tokio::fs::create_dir_all(&cli.output_dir).await {
        error!(
            "Failed to create output directory {}: {}",
            cli.output_dir.display(),
            err
        );
        return;
    }

    let client = match GeminiClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("Failed to set up model client: {:#}", err);
            return;
        }
    };

    let pipeline = Pipeline::new(
        Recognizer::new(client.clone()),
        Synthesizer::new(client, &cli.output_dir),
    );

    if let Err(err) = doodleart::web::setup_server(&cli.listen_address, cli.port, pipeline).await {
        error!("Application error: {}", err);
    }
}
