//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Port to bind (`PORT`, default `3000`).
    pub port: u16,
    /// PostgreSQL URL (`DATABASE_URL`). Absent means in-memory storage.
    pub database_url: Option<String>,
    /// Pool size (`DATABASE_MAX_CONNECTIONS`, default 10).
    pub database_max_connections: u32,
    /// Seed the demo project on an empty log (`SEED_DEMO`, default false).
    pub seed_demo: bool,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => 10,
        };
        let seed_demo = match lookup("SEED_DEMO").as_deref() {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SEED_DEMO must be true or false, got `{other}`"
                )));
            }
        };

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            seed_demo,
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` does not parse.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_use_in_memory_storage() {
        let config = config(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        // Arrange
        let vars = [
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/translations"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("SEED_DEMO", "true"),
        ];

        // Act
        let config = config(&vars).unwrap();

        // Assert
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/translations")
        );
        assert_eq!(config.database_max_connections, 4);
        assert!(config.seed_demo);
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = config(&[("PORT", "not-a-port")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_seed_flag_is_a_config_error() {
        let result = config(&[("SEED_DEMO", "sometimes")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = config(&[("DATABASE_URL", "  ")]).unwrap();

        assert_eq!(config.database_url, None);
    }
}
