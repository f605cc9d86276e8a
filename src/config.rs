//! Configuration module for padron.

use serde::Deserialize;
use std::path::Path;

use crate::auth::{validate_national_id, validate_password, Argon2Hasher};
use crate::identity::NewProfile;
use crate::{PadronError, Result};

/// Environment variable overriding the bootstrap administrator password.
pub const ADMIN_PASSWORD_ENV: &str = "PADRON_ADMIN_PASSWORD";

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to the console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Argon2id work factor.
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Time cost (iterations).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Parallelism (lanes).
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Default administrator created when the registry has none.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
    #[serde(default = "default_admin_national_id")]
    pub national_id: String,
    #[serde(default = "default_admin_given_name")]
    pub given_name: String,
    #[serde(default = "default_admin_family_name")]
    pub family_name: String,
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default = "default_admin_phone")]
    pub phone: String,
    #[serde(default = "default_admin_address")]
    pub address: String,
    #[serde(default = "default_admin_birth_date")]
    pub birth_date: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_national_id() -> String {
    "12345678".to_string()
}

fn default_admin_given_name() -> String {
    "Admin".to_string()
}

fn default_admin_family_name() -> String {
    "Principal".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_phone() -> String {
    "1122334455".to_string()
}

fn default_admin_address() -> String {
    "Calle Falsa 123".to_string()
}

fn default_admin_birth_date() -> String {
    "1990-01-01".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
            national_id: default_admin_national_id(),
            given_name: default_admin_given_name(),
            family_name: default_admin_family_name(),
            email: default_admin_email(),
            phone: default_admin_phone(),
            address: default_admin_address(),
            birth_date: default_admin_birth_date(),
        }
    }
}

impl BootstrapConfig {
    /// Seed profile for the default administrator.
    pub fn profile(&self) -> NewProfile {
        NewProfile::new()
            .with_national_id(&self.national_id)
            .with_name(&self.given_name, &self.family_name)
            .with_email(&self.email)
            .with_phone(&self.phone)
            .with_address(&self.address)
            .with_birth_date(&self.birth_date)
    }
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON snapshot. Empty keeps the registry purely in memory.
    #[serde(default)]
    pub snapshot_path: String,
}

impl StorageConfig {
    /// Get the snapshot path, if persistence is enabled.
    pub fn snapshot_path(&self) -> Option<&Path> {
        if self.snapshot_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.snapshot_path))
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Password hashing cost.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Default administrator.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Snapshot storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PadronError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PadronError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PADRON_ADMIN_PASSWORD`: Override the bootstrap administrator password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            if !password.is_empty() {
                self.bootstrap.password = password;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The bootstrap username is empty
    /// - The bootstrap password fails the password rules
    /// - The bootstrap national ID is set but malformed
    /// - Argon2 rejects the hashing parameters
    pub fn validate(&self) -> Result<()> {
        if self.bootstrap.username.trim().is_empty() {
            return Err(PadronError::Config(
                "bootstrap.username cannot be empty".to_string(),
            ));
        }
        validate_password(&self.bootstrap.password)
            .map_err(|e| PadronError::Config(format!("bootstrap.password: {e}")))?;
        if !self.bootstrap.national_id.is_empty() {
            validate_national_id(&self.bootstrap.national_id)
                .map_err(|e| PadronError::Config(format!("bootstrap.national_id: {e}")))?;
        }
        Argon2Hasher::from_config(&self.hashing)
            .map_err(|e| PadronError::Config(format!("hashing: {e}")))?;
        Ok(())
    }
}
