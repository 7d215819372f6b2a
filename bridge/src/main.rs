use bridge::config::BridgeConfig;
use bridge::transport::HttpTransport;
use log::error;
use service::logging::Logger;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = BridgeConfig::new();
    Logger::init_with_level(config.log_level_filter);

    let client = match bridge::gateway::build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };
    let transport = Arc::new(HttpTransport::new(client, &config.platform_uri));

    if let Err(e) = bridge::serve(config, transport).await {
        error!("Bridge stopped: {e}");
        std::process::exit(1);
    }
}
