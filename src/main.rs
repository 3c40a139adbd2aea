use clap::Parser;
use picstory::config::setup_logging;
use picstory::gemini::GeminiClient;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = picstory::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let gemini = GeminiClient::new(&cli.gemini_api_key, &cli.gemini_model, &cli.gemini_api_base);

    if let Err(err) = picstory::web::setup_server(&cli.listen_address, cli.port, gemini).await {
        error!("Application error: {}", err);
    }
}
