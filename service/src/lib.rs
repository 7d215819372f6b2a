use config::Config;
use log::info;
use mongodb::error::Error as MongoError;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tokio::time::Duration;

pub mod config;
pub mod logging;

/// Builds the MongoDB client. The driver connects lazily, so this only fails on
/// a malformed connection string or an unresolvable SRV record.
pub async fn init_database(config: &Config) -> Result<Client, MongoError> {
    info!(
        "MongoDB pool config: max_pool_size={}, server_selection_timeout={}s",
        config.db_max_pool_size, config.db_server_selection_timeout_secs,
    );

    let mut options =
        ClientOptions::parse(config.mongodb_url().unwrap_or("mongodb://localhost:27017")).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_pool_size = Some(config.db_max_pool_size);
    options.server_selection_timeout =
        Some(Duration::from_secs(config.db_server_selection_timeout_secs));

    Client::with_options(options)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub mongo_client: Client,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, client: &Client) -> Self {
        Self {
            mongo_client: client.clone(),
            config: app_config,
        }
    }

    /// Database holding chats and messages.
    pub fn db(&self) -> Database {
        self.mongo_client.database(&self.config.database_name)
    }

    pub fn logs_db(&self) -> Database {
        self.mongo_client.database(&self.config.logs_database)
    }

    pub fn users_db(&self) -> Database {
        self.mongo_client.database(&self.config.users_database)
    }
}
