use domain::events::EventPublisher;
use log::{error, info, warn};
use service::{config::Config, logging::Logger};
use sse::domain_event_handler::SseDomainEventHandler;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting up in {} mode, serving chats from database [{}]",
        config.runtime_env(),
        config.database_name
    );

    let client = match service::init_database(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to configure MongoDB client: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config.clone(), &client);

    // The server can still answer with stale indexes; queries just get slower
    if let Err(e) = domain::ensure_indexes(
        &service_state.db(),
        &service_state.logs_db(),
        &service_state.users_db(),
    )
    .await
    {
        warn!("Failed to create database indexes: {e}");
    }

    let sse_manager = Arc::new(sse::Manager::new());
    let _heartbeat =
        sse_manager.spawn_heartbeat(Duration::from_secs(config.heartbeat_interval_secs));

    let event_publisher = EventPublisher::new().with_handler(Arc::new(
        SseDomainEventHandler::new(Arc::clone(&sse_manager)),
    ));

    let app_state = web::AppState::new(service_state, sse_manager, event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
