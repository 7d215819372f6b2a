use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;

/// Port the bridge listens on unless overridden.
pub const DEFAULT_PORT: u16 = 52101;
/// `source_name` stamped on every forwarded message.
pub const DEFAULT_SOURCE_NAME: &str = "whatsapp";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about = "Forwards chat platform events into the admin panel", long_about = None)]
pub struct BridgeConfig {
    /// Base URL of the admin panel API (chat registration, QR code upload)
    #[arg(long, env)]
    pub data_service_uri: String,

    /// Base URL of the message processing service; messages go to `<uri>/new_message`
    #[arg(long, env)]
    pub message_processing_uri: String,

    /// Base URL of the platform client that delivers outgoing messages
    #[arg(long, env, default_value = "http://127.0.0.1:52102")]
    pub platform_uri: String,

    /// Value used as `source_name` on forwarded messages and registered chats
    #[arg(long, env, default_value = DEFAULT_SOURCE_NAME)]
    pub source_name: String,

    /// Timeout in seconds for outgoing HTTP requests
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = DEFAULT_PORT)]
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
}

impl BridgeConfig {
    pub fn new() -> Self {
        dotenv().ok();
        BridgeConfig::parse()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.interface, self.port)
    }
}
