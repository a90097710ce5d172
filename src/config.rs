//! Store connection configuration.
//!
//! Settings come from a TOML file, from environment variables, or from both
//! (environment wins). A `.env` file in the working directory is loaded first.
//!
//! ## Environment Variables
//!
//! - `FILTERQL_HOST` - Store host
//! - `FILTERQL_PORT` - Store port
//! - `FILTERQL_DATABASE` - Target database
//! - `FILTERQL_USERNAME` / `FILTERQL_PASSWORD` - Credentials, both or neither
//! - `FILTERQL_APPLICATION_NAME` - Used to derive the default database name

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

pub const ENV_HOST: &str = "FILTERQL_HOST";
pub const ENV_PORT: &str = "FILTERQL_PORT";
pub const ENV_DATABASE: &str = "FILTERQL_DATABASE";
pub const ENV_USERNAME: &str = "FILTERQL_USERNAME";
pub const ENV_PASSWORD: &str = "FILTERQL_PASSWORD";
pub const ENV_APPLICATION_NAME: &str = "FILTERQL_APPLICATION_NAME";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_APPLICATION_NAME: &str = "application";

/// Resolved connection settings.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub application_name: String,
}

/// File layout, every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    application_name: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_parts(ConfigFile::default())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl StoreConfig {
    fn from_parts(file: ConfigFile) -> Self {
        let application_name = file
            .application_name
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string());
        Self {
            host: file.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: file.port.unwrap_or(DEFAULT_PORT),
            database: file
                .database
                .unwrap_or_else(|| default_database(&application_name)),
            username: file.username,
            password: file.password,
            application_name,
        }
    }

    /// Load `.env`, then read settings from the process environment.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file = ConfigFile::default();
        apply_overrides(&mut file, &lookup)?;
        let config = Self::from_parts(file);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> DbResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = Self::from_parts(file);
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> DbResult<Self> {
        dotenvy::dotenv().ok();
        let content = std::fs::read_to_string(path)?;
        let mut file: ConfigFile = toml::from_str(&content)?;
        apply_overrides(&mut file, &|key| std::env::var(key).ok())?;
        let config = Self::from_parts(file);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> DbResult<()> {
        if self.host.is_empty() {
            return Err(DbError::Config("host must not be empty".to_string()));
        }
        if self.database.is_empty() {
            return Err(DbError::Config("database must not be empty".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(DbError::Config(
                "username and password must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Username and password when authentication is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    pub fn connection_uri(&self) -> String {
        match self.credentials() {
            Some((user, password)) => format!(
                "mongodb://{}:{}@{}:{}/{}",
                user, password, self.host, self.port, self.database
            ),
            None => format!("mongodb://{}:{}/{}", self.host, self.port, self.database),
        }
    }

    /// Connection URI safe for logs.
    pub fn redacted_uri(&self) -> String {
        match &self.username {
            Some(user) => format!(
                "mongodb://{}:***@{}:{}/{}",
                user, self.host, self.port, self.database
            ),
            None => self.connection_uri(),
        }
    }
}

fn default_database(application_name: &str) -> String {
    format!("play.{}", application_name)
}

fn apply_overrides(
    file: &mut ConfigFile,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> DbResult<()> {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(host) = non_empty(ENV_HOST) {
        file.host = Some(host);
    }
    if let Some(port) = non_empty(ENV_PORT) {
        let port = port
            .parse::<u16>()
            .map_err(|_| DbError::Config(format!("{} is not a valid port: '{}'", ENV_PORT, port)))?;
        file.port = Some(port);
    }
    if let Some(database) = non_empty(ENV_DATABASE) {
        file.database = Some(database);
    }
    if let Some(username) = non_empty(ENV_USERNAME) {
        file.username = Some(username);
    }
    if let Some(password) = non_empty(ENV_PASSWORD) {
        file.password = Some(password);
    }
    if let Some(name) = non_empty(ENV_APPLICATION_NAME) {
        file.application_name = Some(name);
    }
    Ok(())
}
