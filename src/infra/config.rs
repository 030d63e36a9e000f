//! Configuration management infrastructure.
//!
//! This module provides configuration file support for the engine location,
//! revocation HTTP settings and the remote signing service.

use crate::adapters::remote::RemoteSignerConfig;
use crate::adapters::revocation_http_client::{RevocationHttpConfig, MAX_CONCURRENT_FETCHES};
use crate::infra::error::{SigningError, SigningResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfiguration {
    /// Root directory with one subdirectory per platform build of the engine
    pub library_dir: String,

    /// Engine library name without `lib` prefix and extension
    pub engine_library: String,

    /// OCSP/CRL retrieval settings
    pub revocation: RevocationSettings,

    /// Remote signing service settings
    pub signing_service: SigningServiceSettings,
}

/// Revocation HTTP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationSettings {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    /// Idle pooled connections are dropped after this long
    pub pool_idle_timeout_seconds: u64,
    pub pool_max_idle_per_host: usize,
    pub max_concurrent_fetches: usize,
    /// Disable TLS certificate validation (never enable in production)
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

/// Remote signing service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningServiceSettings {
    /// Sign endpoint; `None` leaves signing to a caller-supplied signer
    pub url: Option<String>,
    /// HTTP timeout for one request to the service
    pub timeout_seconds: u64,
    /// Overall bound the workflow applies around the signer
    pub signing_timeout_seconds: u64,
    pub accept_invalid_certs: bool,
}

impl Default for SignerConfiguration {
    fn default() -> Self {
        Self {
            library_dir: "lib".to_string(),
            engine_library: "signpdfkit".to_string(),
            revocation: RevocationSettings::default(),
            signing_service: SigningServiceSettings::default(),
        }
    }
}

impl Default for RevocationSettings {
    fn default() -> Self {
        let http = RevocationHttpConfig::default();
        Self {
            timeout_seconds: http.timeout.as_secs(),
            connect_timeout_seconds: http.connect_timeout.as_secs(),
            pool_idle_timeout_seconds: http.pool_idle_timeout.as_secs(),
            pool_max_idle_per_host: http.pool_max_idle_per_host,
            max_concurrent_fetches: http.max_concurrent_fetches,
            accept_invalid_certs: false,
            user_agent: http.user_agent,
        }
    }
}

impl Default for SigningServiceSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: 30,
            signing_timeout_seconds: 60,
            accept_invalid_certs: false,
        }
    }
}

impl From<&RevocationSettings> for RevocationHttpConfig {
    fn from(s: &RevocationSettings) -> Self {
        Self {
            timeout: Duration::from_secs(s.timeout_seconds),
            connect_timeout: Duration::from_secs(s.connect_timeout_seconds),
            pool_idle_timeout: Duration::from_secs(s.pool_idle_timeout_seconds),
            pool_max_idle_per_host: s.pool_max_idle_per_host,
            max_concurrent_fetches: s.max_concurrent_fetches,
            accept_invalid_certs: s.accept_invalid_certs,
            user_agent: s.user_agent.clone(),
        }
    }
}

impl SigningServiceSettings {
    /// Remote signer settings, if a service URL is configured.
    #[must_use]
    pub fn remote_signer_config(&self) -> Option<RemoteSignerConfig> {
        self.url.as_ref().map(|url| {
            let cfg = RemoteSignerConfig::new(url.clone()).with_timeout(self.timeout_seconds);
            if self.accept_invalid_certs {
                cfg.with_insecure_tls()
            } else {
                cfg
            }
        })
    }

    #[must_use]
    pub fn signing_timeout(&self) -> Duration {
        Duration::from_secs(self.signing_timeout_seconds)
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> SigningResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> SigningResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("pdf-remote-signer").join("config.toml"))
        } else {
            Ok(PathBuf::from("pdf-remote-signer.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> SigningResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = SignerConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file, or defaults if there is none
    pub fn load_or_default(&self) -> SigningResult<SignerConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(SignerConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SigningResult<SignerConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: SignerConfiguration = toml::from_str(&content).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &SignerConfiguration) -> SigningResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SigningError::ConfigurationError(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> SigningResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "library_dir" => config.library_dir = value.to_string(),
            "engine_library" => config.engine_library = value.to_string(),
            "revocation.timeout_seconds" => {
                config.revocation.timeout_seconds = parse_value(key, value)?;
            }
            "revocation.max_concurrent_fetches" => {
                config.revocation.max_concurrent_fetches = parse_value(key, value)?;
            }
            "revocation.accept_invalid_certs" => {
                config.revocation.accept_invalid_certs = parse_value(key, value)?;
            }
            "signing_service.url" => {
                config.signing_service.url = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "signing_service.timeout_seconds" => {
                config.signing_service.timeout_seconds = parse_value(key, value)?;
            }
            "signing_service.signing_timeout_seconds" => {
                config.signing_service.signing_timeout_seconds = parse_value(key, value)?;
            }
            _ => {
                return Err(SigningError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        validate_config(&config)?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SigningResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> SigningResult<()> {
        let config: SignerConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
            ExportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("YAML import failed: {e}"))
            })?,
        };

        validate_config(&config)?;
        self.save(&config)
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}

/// Validate configuration values
pub fn validate_config(config: &SignerConfiguration) -> SigningResult<()> {
    if config.engine_library.trim().is_empty() {
        return Err(SigningError::ConfigurationError(
            "Engine library name must not be empty".to_string(),
        ));
    }

    let rev = &config.revocation;
    for (name, secs) in [
        ("revocation.timeout_seconds", rev.timeout_seconds),
        ("revocation.connect_timeout_seconds", rev.connect_timeout_seconds),
        ("revocation.pool_idle_timeout_seconds", rev.pool_idle_timeout_seconds),
        ("signing_service.timeout_seconds", config.signing_service.timeout_seconds),
        (
            "signing_service.signing_timeout_seconds",
            config.signing_service.signing_timeout_seconds,
        ),
    ] {
        if secs == 0 {
            return Err(SigningError::ConfigurationError(format!(
                "{name} must be greater than 0"
            )));
        }
    }

    if rev.max_concurrent_fetches == 0 || rev.max_concurrent_fetches > MAX_CONCURRENT_FETCHES {
        return Err(SigningError::ConfigurationError(format!(
            "revocation.max_concurrent_fetches must be between 1 and {MAX_CONCURRENT_FETCHES}"
        )));
    }

    if let Some(url) = &config.signing_service.url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SigningError::ConfigurationError(format!(
                "Signing service URL must start with http:// or https://, got: {url}"
            )));
        }
    }

    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> SigningResult<T> {
    value.parse().map_err(|_| {
        SigningError::ConfigurationError(format!("Invalid value for {key}: {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_configuration() {
        let config = SignerConfiguration::default();
        assert_eq!(config.revocation.timeout_seconds, 30);
        assert_eq!(config.revocation.pool_idle_timeout_seconds, 30);
        assert!(!config.revocation.accept_invalid_certs);
        assert!(config.signing_service.url.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = SignerConfiguration::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: SignerConfiguration = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: SignerConfiguration =
            toml::from_str("library_dir = \"/opt/engine\"\n[revocation]\ntimeout_seconds = 5\n")
                .unwrap();
        assert_eq!(config.library_dir, "/opt/engine");
        assert_eq!(config.revocation.timeout_seconds, 5);
        assert_eq!(config.revocation.max_concurrent_fetches, 4);
    }

    #[test]
    fn test_config_manager_with_temp_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(&config_path);

        let config = manager.load_or_create_default().unwrap();
        assert!(config_path.exists());

        let loaded_config = manager.load().unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_update_value_validates() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));

        manager
            .update_value("signing_service.url", "https://sign.example.test/api/sign")
            .unwrap();
        manager.update_value("revocation.max_concurrent_fetches", "8").unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.revocation.max_concurrent_fetches, 8);
        assert!(config.signing_service.remote_signer_config().is_some());

        assert!(manager.update_value("revocation.timeout_seconds", "0").is_err());
        assert!(manager.update_value("revocation.accept_invalid_certs", "maybe").is_err());
        assert!(manager.update_value("signing_service.url", "ftp://x").is_err());
        assert!(manager.update_value("no.such.key", "1").is_err());
        assert!(manager
            .update_value("revocation.max_concurrent_fetches", "65")
            .is_err());
        assert_eq!(manager.load().unwrap().revocation.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_oversized_concurrency_is_rejected() {
        let mut config = SignerConfiguration::default();
        config.revocation.max_concurrent_fetches = usize::MAX;
        assert!(validate_config(&config).is_err());
        config.revocation.max_concurrent_fetches = MAX_CONCURRENT_FETCHES;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_export_import_formats() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));
        for format in [ExportFormat::Toml, ExportFormat::Json, ExportFormat::Yaml] {
            let exported = manager.export_config(format).unwrap();
            manager.import_config(&exported, format).unwrap();
        }
        assert_eq!(manager.load().unwrap(), SignerConfiguration::default());
    }

    #[test]
    fn test_settings_convert_to_runtime_configs() {
        let mut settings = SigningServiceSettings::default();
        assert!(settings.remote_signer_config().is_none());
        settings.url = Some("https://sign.example.test".to_string());
        settings.accept_invalid_certs = true;
        let remote = settings.remote_signer_config().unwrap();
        assert!(!remote.verify_tls);
        assert_eq!(settings.signing_timeout(), Duration::from_secs(60));

        let http = RevocationHttpConfig::from(&RevocationSettings::default());
        assert_eq!(http.timeout, Duration::from_secs(30));
    }
}
