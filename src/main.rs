mod application;
mod domain;
mod infrastructure;
mod presentation;

use infrastructure::{AppConfig, AppContainer};
use presentation::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let container = AppContainer::new(config).await?;

    HttpServer::new(
        container.upload_handler.clone(),
        container.config.port,
        container.config.max_upload_bytes,
    )
    .run()
    .await
}
