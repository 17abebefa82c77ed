use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CALLDASH";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub data: Option<DataConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors: None,
            server: Some(ServerConfig::default()),
            data: Some(DataConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Where the three source files live and how to read them
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DataConfig {
    pub merged_path: PathBuf,
    pub calls_path: PathBuf,
    pub orders_path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_cache_sources")]
    pub cache_sources: bool,
}

pub const MERGED_FILE: &str = "merged_data.csv";
pub const CALLS_FILE: &str = "call_data.csv";
pub const ORDERS_FILE: &str = "shopify_orders.csv";

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_cache_sources() -> bool {
    true
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("data"))
    }
}

impl DataConfig {
    /// Default file names under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            merged_path: dir.join(MERGED_FILE),
            calls_path: dir.join(CALLS_FILE),
            orders_path: dir.join(ORDERS_FILE),
            delimiter: default_delimiter(),
            cache_sources: default_cache_sources(),
        }
    }

    /// Keeps the reading options but moves the files under `dir`.
    pub fn rebased(&self, dir: &Path) -> Self {
        Self {
            delimiter: self.delimiter.clone(),
            cache_sources: self.cache_sources,
            ..Self::in_dir(dir)
        }
    }

    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(ConfigError::Message(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

impl ApiConfig {
    /// Loads `path`, or the per-user config file when `path` is `None`.
    ///
    /// A commented default file is written when the per-user file is missing.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as `load`, reading `CALLDASH__*` overrides from `env` instead of
    /// the process environment when given.
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = get_config_path();
                write_default_config(&default_path)?;
                default_path
            }
        };

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        if let Some(data) = &config.data {
            data.delimiter_byte()?;
        }

        Ok((config, config_path))
    }

    pub fn data_or_default(&self) -> DataConfig {
        self.data.clone().unwrap_or_default()
    }

    pub fn server_or_default(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
}

fn write_default_config(config_path: &Path) -> Result<(), ConfigError> {
    if config_path.exists() {
        return Ok(());
    }

    // Create config directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::Message(format!("Failed to create config directory: {e}"))
        })?;
    }

    let body = toml::to_string_pretty(&ApiConfig::default())
        .map_err(|e| ConfigError::Message(format!("Failed to serialize default config: {e}")))?;

    let default_config = format!(
        "# calldash dashboard settings\n\
         # Relative data paths resolve against the working directory.\n\
         # Uncomment to restrict which origins may call the JSON endpoints:\n\
         # [cors]\n\
         # allowed_origins = [\"http://localhost:3000\"]\n\n{body}"
    );

    std::fs::write(config_path, default_config)
        .map_err(|e| ConfigError::Message(format!("Failed to write default config: {e}")))
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("calldash").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
