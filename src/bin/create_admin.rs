//! Creates a dashboard account with the `admin` role. Database settings come
//! from the same environment variables the server reads.
use clap::Parser;
use domain::user::{self as UserApi, NewUser};
use log::{error, info};
use service::{config::Config, logging::Logger};

#[derive(Debug, Parser)]
#[command(author, version, about = "Create an admin account for the dashboard", long_about = None)]
struct Args {
    #[arg(long, env = "ADMIN_USERNAME")]
    username: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    /// Display name shown in the dashboard
    #[arg(long, env = "ADMIN_NAME", default_value = "Administrator")]
    name: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::default();
    Logger::init_logger(&config as &Config);

    let client = match service::init_database(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to configure MongoDB client: {e}");
            std::process::exit(1);
        }
    };
    let service_state = service::AppState::new(config, &client);

    let params = NewUser {
        username: Some(args.username),
        password: Some(args.password),
        name: Some(args.name),
        role: Some("admin".to_string()),
    };

    match UserApi::create(&service_state.users_db(), params).await {
        Ok(user) => info!("Created admin {} ({})", user.username, user.id),
        Err(e) => {
            error!("Failed to create admin: {e}");
            std::process::exit(1);
        }
    }
}
