use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Database used for chats and messages unless overridden.
pub const DEFAULT_DATABASE_NAME: &str = "admin-panel";
/// Database holding the `logs` collection.
pub const DEFAULT_LOGS_DATABASE: &str = "admin-panel";
/// Database holding dashboard accounts.
pub const DEFAULT_USERS_DATABASE: &str = "agro";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Sets the MongoDB connection string to connect to
    #[arg(short, long, env, default_value = "mongodb://localhost:27017")]
    mongodb_url: Option<String>,

    /// Database holding the chats and messages collections
    #[arg(long, env, default_value = DEFAULT_DATABASE_NAME)]
    pub database_name: String,

    /// Database holding the logs collection
    #[arg(long, env, default_value = DEFAULT_LOGS_DATABASE)]
    pub logs_database: String,

    /// Database holding dashboard user accounts
    #[arg(long, env, default_value = DEFAULT_USERS_DATABASE)]
    pub users_database: String,

    /// Maximum number of connections in the driver's pool
    #[arg(long, env, default_value_t = 100)]
    pub db_max_pool_size: u32,

    /// Timeout in seconds for selecting a server before an operation fails
    #[arg(long, env, default_value_t = 8)]
    pub db_server_selection_timeout_secs: u64,

    /// Seconds between heartbeat events pushed to live message streams
    #[arg(long, env, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_interval_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    /// Builds a config from the environment only, ignoring process arguments.
    fn default() -> Self {
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn mongodb_url(&self) -> Option<&str> {
        self.mongodb_url.as_deref()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}
