use tabletop_tasks::{api, config::AppConfig};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = dotenv_result {
        let missing_file = matches!(
            &err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        );
        if !missing_file {
            warn!(error = %err, "could not load .env");
        }
    }

    let app_config = AppConfig::from_env();
    let placement = app_config.placement.placement_config();

    if let Err(err) = api::start_api_server(app_config.api, placement, app_config.reset).await {
        error!(error = %err, "API server terminated with an error");
        std::process::exit(1);
    }
}
