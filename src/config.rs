//! Configuration for the vehicle service.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VEHICLES_HOME, VEHICLES_DB, VEHICLES_PRICING_URL, VEHICLES_MAPS_URL)
//! 2. Config file (.vehicles/config.yaml)
//! 3. Defaults (~/.vehicles)
//!
//! Config file discovery:
//! - Searches current directory and parents for .vehicles/config.yaml
//! - A relative store path is resolved against the .vehicles/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{CreatedAtPolicy, EnrichmentSettings};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_DATABASE: &str = "vehicles.db";
const DEFAULT_PRICING_URL: &str = "http://localhost:8082";
const DEFAULT_MAPS_URL: &str = "http://localhost:9191";
const DEFAULT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_PRICING_ADDRESS: &str = "127.0.0.1:8082";
const DEFAULT_PRICING_SEED: i64 = 19;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pricing: Option<ServiceConfig>,
    #[serde(default)]
    pub maps: Option<ServiceConfig>,
    #[serde(default)]
    pub enrichment: Option<EnrichmentConfig>,
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file (relative to .vehicles/)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    pub list_concurrency: Option<usize>,
    pub created_at_on_update: Option<CreatedAtPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: Option<String>,
    pub pricing_address: Option<String>,
    pub pricing_seed: Option<i64>,
}

/// Environment overrides, read once per load
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub home: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub pricing_url: Option<String>,
    pub maps_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            home: std::env::var("VEHICLES_HOME").ok().map(PathBuf::from),
            database: std::env::var("VEHICLES_DB").ok().map(PathBuf::from),
            pricing_url: std::env::var("VEHICLES_PRICING_URL").ok(),
            maps_url: std::env::var("VEHICLES_MAPS_URL").ok(),
        }
    }
}

/// Resolved settings for one collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ServiceSettings {
    fn resolve(
        section: Option<&ServiceConfig>,
        env_url: Option<&String>,
        default_url: &str,
    ) -> Self {
        let base_url = env_url
            .cloned()
            .or_else(|| section.and_then(|s| s.base_url.clone()))
            .unwrap_or_else(|| default_url.to_string());

        Self {
            base_url,
            timeout_ms: section
                .and_then(|s| s.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub address: String,
    pub pricing_address: String,
    pub pricing_seed: i64,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Service home directory
    pub home: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
    /// Pricing collaborator
    pub pricing: ServiceSettings,
    /// Maps collaborator
    pub maps: ServiceSettings,
    /// Records enriched at once by list
    pub list_concurrency: usize,
    /// Update rule for created_at
    pub created_at_on_update: CreatedAtPolicy,
    /// Listen addresses
    pub server: ServerSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Enrichment tuning for the vehicle service
    pub fn enrichment_settings(&self) -> EnrichmentSettings {
        EnrichmentSettings {
            price_timeout: self.pricing.timeout(),
            location_timeout: self.maps.timeout(),
            list_concurrency: self.list_concurrency,
            created_at_on_update: self.created_at_on_update,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".vehicles").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file, environment overrides and defaults
fn resolve(
    file: Option<(&Path, &ConfigFile)>,
    env: &EnvOverrides,
    default_home: PathBuf,
) -> Result<ResolvedConfig> {
    let home = env.home.clone().unwrap_or(default_home);

    let config = file.map(|(_, config)| config);
    let config_dir = file
        .and_then(|(path, _)| path.parent())
        .map(Path::to_path_buf);

    let database = if let Some(ref db) = env.database {
        db.clone()
    } else {
        match (config.and_then(|c| c.store.path.as_deref()), &config_dir) {
            (Some(path), Some(dir)) => resolve_path(dir, path),
            _ => home.join(DEFAULT_DATABASE),
        }
    };

    let pricing = ServiceSettings::resolve(
        config.and_then(|c| c.pricing.as_ref()),
        env.pricing_url.as_ref(),
        DEFAULT_PRICING_URL,
    );
    let maps = ServiceSettings::resolve(
        config.and_then(|c| c.maps.as_ref()),
        env.maps_url.as_ref(),
        DEFAULT_MAPS_URL,
    );

    let enrichment = config.and_then(|c| c.enrichment.as_ref());
    let list_concurrency = enrichment.and_then(|e| e.list_concurrency).unwrap_or(1);
    if list_concurrency == 0 {
        anyhow::bail!("enrichment.list_concurrency must be at least 1");
    }
    let created_at_on_update = enrichment
        .and_then(|e| e.created_at_on_update)
        .unwrap_or_default();

    let server_section = config.and_then(|c| c.server.as_ref());
    let server = ServerSettings {
        address: server_section
            .and_then(|s| s.address.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        pricing_address: server_section
            .and_then(|s| s.pricing_address.clone())
            .unwrap_or_else(|| DEFAULT_PRICING_ADDRESS.to_string()),
        pricing_seed: server_section
            .and_then(|s| s.pricing_seed)
            .unwrap_or(DEFAULT_PRICING_SEED),
    };

    Ok(ResolvedConfig {
        home,
        database,
        pricing,
        maps,
        list_concurrency,
        created_at_on_update,
        server,
        config_file: file.map(|(path, _)| path.to_path_buf()),
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".vehicles");

    let env = EnvOverrides::from_env();

    match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            resolve(Some((path.as_path(), &file)), &env, default_home)
        }
        None => resolve(None, &env, default_home),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
