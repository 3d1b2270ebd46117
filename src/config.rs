use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_DATA_URL: &str = "https://gist.githubusercontent.com/curran/a08a1080b88344b0c8a7/raw/0e7a9b0a5d22642a06d3d5b9bcbad9890c8ee534/iris.csv";

/// Service configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 7000)
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// CSV source used by `/records/sync` when no url is given
    pub default_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: trace, debug, info, warn, error
    pub level: String,
    /// Colour log output
    pub ansi: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 7000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./data/iris.db") }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { default_url: DEFAULT_DATA_URL.to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), ansi: true }
    }
}

impl Config {
    /// Defaults, overlaid by the TOML file if given, overlaid by `IRISDB_*`
    /// environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Internal(format!("cannot read config {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
            .map_err(|e| Error::Parse(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Overrides settings from environment variables, read through `lookup`
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) -> Result<()> {
        if let Some(host) = lookup("IRISDB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("IRISDB_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Parse(format!("IRISDB_PORT is not a port number: {}", port)))?;
        }
        if let Some(path) = lookup("IRISDB_SQL_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("IRISDB_DATA_URL") {
            self.sync.default_url = url;
        }
        if let Some(level) = lookup("IRISDB_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf};

    use super::{Config, DEFAULT_DATA_URL};
    use crate::error::{Error, Result};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.sync.default_url, DEFAULT_DATA_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() -> Result<()> {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            path = ":memory:"
            "#,
        )?;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.logging, Config::default().logging);

        assert!(matches!(Config::from_toml("[server]\nport = \"x\""), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_config_serialization() -> Result<()> {
        let config = Config::default();
        let toml_str = toml::to_string(&config).map_err(|e| Error::Internal(e.to_string()))?;
        assert_eq!(Config::from_toml(&toml_str)?, config);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env = HashMap::from([
            ("IRISDB_PORT", "9000"),
            ("IRISDB_SQL_PATH", "/tmp/iris.db"),
            ("IRISDB_DATA_URL", "http://localhost/iris.csv"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()))?;
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/iris.db"));
        assert_eq!(config.sync.default_url, "http://localhost/iris.csv");
        assert_eq!(config.server.host, "0.0.0.0");

        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "IRISDB_PORT").then(|| "seventy".to_string()));
        assert!(matches!(result, Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("irisdb.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n")?;
        let config = Config::load_from(&path)?;
        assert_eq!(config.logging.level, "debug");

        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
        Ok(())
    }
}
