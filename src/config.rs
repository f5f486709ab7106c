use crate::{explorer::Side, role::ContractRole};
use config::{
    builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment as EnvironmentVariables,
    File, FileFormat,
};
use ethers::types::{Address, Chain};
use reqwest::Url;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

/// Settings compiled into the binary, compared against Balancer V2 on mainnet and Beethoven X on
/// Fantom.
const DEFAULT_SETTINGS: &str = include_str!("../config/base.toml");

/// All settings for a comparison run.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// Application settings.
    pub application: ApplicationSettings,

    /// The explorer and addresses of the reference deployment.
    pub origin: ExplorerSettings,

    /// The explorer and addresses of the deployment compared against `origin`.
    pub fork: ExplorerSettings,
}

/// Application settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ApplicationSettings {
    /// Directory in which `<role>.origin.txt` and `<role>.fork.txt` are created when sources
    /// differ.
    pub output_dir: PathBuf,

    /// Upper bound for a single explorer request, in seconds.
    pub request_timeout_secs: u64,
}

impl ApplicationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One Etherscan-compatible explorer and the contract addresses looked up on it.
#[derive(Clone, Debug, Deserialize)]
pub struct ExplorerSettings {
    /// Label used in logs.
    pub name: String,

    /// Chain name as understood by `ethers`, e.g. `mainnet` or `fantom`. Used to find the default
    /// API endpoint and API key variable.
    #[serde(default)]
    pub chain: Option<String>,

    /// API endpoint. Takes precedence over the chain's default endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    /// May be empty, in which case the explorer's unauthenticated tier applies.
    #[serde(default)]
    pub api_key: String,

    pub addresses: BTreeMap<ContractRole, Address>,
}

impl ExplorerSettings {
    pub fn chain(&self) -> Result<Option<Chain>, ConfigError> {
        self.chain
            .as_deref()
            .map(|name| {
                Chain::from_str(name).map_err(|_| {
                    ConfigError::Message(format!("{name} is not a supported chain name"))
                })
            })
            .transpose()
    }

    /// Returns `base_url` when set, otherwise the Etherscan-compatible API of `chain`.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = match (&self.base_url, self.chain()?) {
            (Some(url), _) => url.clone(),
            (None, Some(chain)) => chain
                .etherscan_urls()
                .map(|(api_url, _)| api_url.to_string())
                .ok_or_else(|| {
                    ConfigError::Message(format!("no known explorer for chain {chain}, set base_url"))
                })?,
            (None, None) => {
                return Err(ConfigError::Message(format!(
                    "explorer {} needs either `base_url` or `chain`",
                    self.name
                )))
            }
        };
        Url::parse(&url).map_err(|err| ConfigError::Message(format!("invalid base_url {url}: {err}")))
    }

    /// Returns the configured key, falling back to the chain's conventional environment variable
    /// (e.g. `ETHERSCAN_API_KEY`) when it is empty.
    pub fn api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone()
        }
        self.chain()
            .ok()
            .flatten()
            .and_then(|chain| chain.etherscan_api_key_name())
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }
}

impl Settings {
    pub fn explorer(&self, side: Side) -> &ExplorerSettings {
        match side {
            Side::Origin => &self.origin,
            Side::Fork => &self.fork,
        }
    }

    /// Checks that both address tables cover every role and that both endpoints resolve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in [Side::Origin, Side::Fork] {
            let explorer = self.explorer(side);
            let missing: Vec<&str> = ContractRole::ALL
                .iter()
                .filter(|role| !explorer.addresses.contains_key(role))
                .map(|role| role.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(ConfigError::Message(format!(
                    "{side} address table is missing: {}",
                    missing.join(", ")
                )))
            }
            explorer.api_url()?;
        }
        Ok(())
    }
}

/// Reads the compiled-in defaults, then `config/<APP_ENVIRONMENT>.toml`, then `config_file` if
/// given, then `APP_`-prefixed environment variables, and returns the validated settings.
pub fn get_configuration(config_file: Option<&Path>) -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|err| ConfigError::Foreign(Box::new(err)))?;
    let config_dir = base_path.join("config");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let environment_filename = format!("{}.toml", environment.as_str());

    let mut builder = defaults()
        .add_source(File::from(config_dir.join(environment_filename)).required(false));
    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        EnvironmentVariables::with_prefix("APP").prefix_separator("_").separator("__"),
    );

    build(builder)
}

fn defaults() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// The possible runtime environments for the application.
pub enum Environment {
    /// Local development environment.
    Local,
    /// Production environment.
    Production,
}

impl Environment {
    /// Returns the environment as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Must be `local` or `production`"
            )),
        }
    }
}
