//! Layered application configuration.
//!
//! Sources, lowest priority first: built-in defaults, `config/default`,
//! `config/{INVENTREE_ENV}` (default `development`), `config/local`, then
//! environment variables prefixed `INVENTREE` with `__` between keys
//! (e.g. `INVENTREE__SERVER__PORT=9000`). A `.env` file is read first.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use inventree_observability::LogSettings;
use inventree_pricing::PricingSettings;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LogSettings,
    pub pricing: PricingConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Roll up BOM prices from internal prices where sub-parts have them.
    pub bom_use_internal_price: bool,
}

impl From<&PricingConfig> for PricingSettings {
    fn from(value: &PricingConfig) -> Self {
        Self {
            bom_use_internal_price: value.bom_use_internal_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON fixture loaded into the in-memory catalog and stock ledger at startup.
    pub seed_file: Option<PathBuf>,
    /// Directory relative paths below are resolved against.
    pub base_dir: PathBuf,
    /// Uploaded files.
    pub media_dir: PathBuf,
    /// Static assets.
    pub static_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            base_dir: PathBuf::from("."),
            media_dir: PathBuf::from("media"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl DataConfig {
    fn settings_dir(&self, dir: &Path, create: bool) -> io::Result<PathBuf> {
        let path = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        };
        if create {
            fs::create_dir_all(&path)?;
        }
        Ok(path)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("INVENTREE_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("INVENTREE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }

    /// Location of uploaded files, created on request.
    pub fn media_dir(&self, create: bool) -> io::Result<PathBuf> {
        self.data.settings_dir(&self.data.media_dir, create)
    }

    /// Location of static assets, created on request.
    pub fn static_dir(&self, create: bool) -> io::Result<PathBuf> {
        self.data.settings_dir(&self.data.static_dir, create)
    }
}
