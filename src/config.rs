use crate::token::ClientSecret;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Port used when `SERVER_PORT` is not provided.
pub const DEFAULT_SERVER_PORT: u16 = 8000;
/// Outbound request timeout used when `TIGRIS_REQUEST_TIMEOUT_SECS` is not provided.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host (optionally with scheme) of the Tigris HTTP API.
    pub tigris_uri: String,
    /// Project that owns every collection and branch addressed by the relay.
    pub tigris_project: String,
    /// Client id used for the client-credentials exchange.
    pub client_id: String,
    /// Client secret used for the client-credentials exchange.
    pub client_secret: ClientSecret,
    /// Port the HTTP server listens on.
    pub server_port: u16,
    /// Upper bound for every outbound request, in seconds.
    pub request_timeout_secs: u64,
    /// Whether demo literals or caller parameters shape search/delete bodies.
    pub payload_mode: PayloadMode,
}

/// Controls how routes with historical literal payloads build their request bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayloadMode {
    /// Send the fixed quickstart bodies, ignoring the search query and delete id.
    #[default]
    Demo,
    /// Build search and delete bodies from the caller's parameters.
    Parameterized,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Blank values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let load_env_optional =
            |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let load_env = |key: &str| {
            load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
        };

        Ok(Self {
            tigris_uri: load_env("TIGRIS_URI")?,
            tigris_project: load_env("TIGRIS_PROJECT")?,
            client_id: load_env("TIGRIS_ID")?,
            client_secret: ClientSecret::new(load_env("TIGRIS_SECRET")?),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_SERVER_PORT),
            request_timeout_secs: load_env_optional("TIGRIS_REQUEST_TIMEOUT_SECS")
                .map(|value| match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(secs),
                    _ => Err(ConfigError::InvalidValue(
                        "TIGRIS_REQUEST_TIMEOUT_SECS".into(),
                    )),
                })
                .transpose()?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            payload_mode: load_env_optional("RELAY_PAYLOAD_MODE")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("RELAY_PAYLOAD_MODE".into()))
                })
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl std::str::FromStr for PayloadMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "demo" => Ok(Self::Demo),
            "parameterized" => Ok(Self::Parameterized),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the process environment and install it in the global cache.
///
/// Once a configuration is installed, later calls return it without reading the environment
/// again. Any `.env` file must already be loaded by the caller.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::from_env()?;
    tracing::debug!(
        tigris_uri = %config.tigris_uri,
        project = %config.tigris_project,
        server_port = config.server_port,
        request_timeout_secs = config.request_timeout_secs,
        payload_mode = ?config.payload_mode,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
