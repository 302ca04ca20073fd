//! Configuration management for cipherkit

use crate::algorithm::CipherOptions;
use crate::crypto::{AesMode, KeySize, OutputFormat};
use crate::error::{Error, Result};
use crate::keygen::{AesKeyStyle, KeygenOptions};
use crate::rsa::{self, is_probable_prime};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `aes.mode`
pub const ENV_AES_MODE: &str = "CIPHERKIT_AES_MODE";

/// Environment variable overriding `aes.output_format`
pub const ENV_OUTPUT_FORMAT: &str = "CIPHERKIT_OUTPUT_FORMAT";

/// Environment variable overriding `logging.level`
pub const ENV_LOG: &str = "CIPHERKIT_LOG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// AES defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesConfig {
    #[serde(default)]
    pub mode: AesMode,

    #[serde(default)]
    pub output_format: OutputFormat,
}

/// RSA defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaConfig {
    /// First prime for `rsa keygen` without arguments
    #[serde(default = "default_p")]
    pub p: u64,

    /// Second prime
    #[serde(default = "default_q")]
    pub q: u64,

    /// Bit length of each prime for randomly generated key pairs
    #[serde(default = "default_prime_bits")]
    pub random_prime_bits: u64,
}

fn default_p() -> u64 {
    rsa::keys::DEFAULT_P
}

fn default_q() -> u64 {
    rsa::keys::DEFAULT_Q
}

fn default_prime_bits() -> u64 {
    32
}

impl Default for RsaConfig {
    fn default() -> Self {
        RsaConfig {
            p: default_p(),
            q: default_q(),
            random_prime_bits: default_prime_bits(),
        }
    }
}

/// Key generation defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeygenConfig {
    /// AES key length in bytes (16, 24 or 32)
    #[serde(default = "default_aes_key_bytes")]
    pub aes_key_bytes: usize,

    #[serde(default)]
    pub aes_key_style: AesKeyStyle,
}

fn default_aes_key_bytes() -> usize {
    32
}

impl Default for KeygenConfig {
    fn default() -> Self {
        KeygenConfig {
            aes_key_bytes: default_aes_key_bytes(),
            aes_key_style: AesKeyStyle::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aes: AesConfig,

    #[serde(default)]
    pub rsa: RsaConfig,

    #[serde(default)]
    pub keygen: KeygenConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl Config {
    /// Default config file location (`<config dir>/cipherkit/config.yaml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cipherkit")
            .join("config.yaml")
    }

    /// Load configuration from a file (YAML or JSON), with environment
    /// variable substitution and overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let content = Self::substitute_env_vars(&content)?;

        let mut config: Config = if is_yaml(path_ref) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse JSON config: {}", e)))?
        };

        config.apply_env_overrides();
        config.validate()?;

        debug!("Loaded configuration from {}", path_ref.display());
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Substitute `${VAR_NAME}` with the variable's value; unset variables
    /// are left as written
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| Error::Config(format!("Invalid substitution pattern: {}", e)))?;

        Ok(re
            .replace_all(content, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_AES_MODE) {
            match mode.parse::<AesMode>() {
                Ok(mode) => self.aes.mode = mode,
                Err(e) => debug!("Ignoring {}: {}", ENV_AES_MODE, e),
            }
        }

        if let Some(format) = lookup(ENV_OUTPUT_FORMAT) {
            match format.parse::<OutputFormat>() {
                Ok(format) => self.aes.output_format = format,
                Err(e) => debug!("Ignoring {}: {}", ENV_OUTPUT_FORMAT, e),
            }
        }

        if let Some(level) = lookup(ENV_LOG) {
            let level = level.trim().to_lowercase();
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Save configuration to a file (format determined by extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let content = if is_yaml(path_ref) {
            serde_yaml::to_string(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to YAML: {}", e))
            })?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to JSON: {}", e))
            })?
        };

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path_ref, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if KeySize::from_len(self.keygen.aes_key_bytes).is_none() {
            return Err(Error::InvalidConfig(format!(
                "keygen.aes_key_bytes must be 16, 24 or 32, got {}",
                self.keygen.aes_key_bytes
            )));
        }

        if self.rsa.p < 2 || self.rsa.q < 2 {
            return Err(Error::InvalidConfig(
                "RSA primes must be at least 2".to_string(),
            ));
        }

        if self.rsa.p == self.rsa.q {
            return Err(Error::InvalidConfig(
                "RSA primes p and q must differ".to_string(),
            ));
        }

        for prime in [self.rsa.p, self.rsa.q] {
            if !is_probable_prime(&BigUint::from(prime)) {
                return Err(Error::InvalidConfig(format!(
                    "RSA default {} is not prime",
                    prime
                )));
            }
        }

        if !(8..=4096).contains(&self.rsa.random_prime_bits) {
            return Err(Error::InvalidConfig(format!(
                "rsa.random_prime_bits must be between 8 and 4096, got {}",
                self.rsa.random_prime_bits
            )));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "Unknown log level '{}' (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Options passed to `Algorithm::encrypt_with`
    pub fn cipher_options(&self) -> CipherOptions {
        CipherOptions {
            aes_mode: self.aes.mode,
            output_format: self.aes.output_format,
        }
    }

    pub fn keygen_options(&self) -> KeygenOptions {
        KeygenOptions {
            aes_key_bytes: self.keygen.aes_key_bytes,
            aes_key_style: self.keygen.aes_key_style,
            rsa_prime_bits: self.rsa.random_prime_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.aes.mode, AesMode::Cbc);
        assert_eq!(config.rsa.p, 7919);
        assert_eq!(config.rsa.q, 1009);
        assert_eq!(config.keygen.aes_key_bytes, 32);
        assert_eq!(config.cipher_options(), CipherOptions::default());
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.aes.mode = AesMode::Gcm;
        config.aes.output_format = OutputFormat::Hex;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.aes.mode, AesMode::Gcm);
        assert_eq!(loaded.cipher_options().output_format, OutputFormat::Hex);
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.keygen.aes_key_bytes = 16;
        config.keygen.aes_key_style = AesKeyStyle::Hex;
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("aes_key_style: hex"));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.keygen_options().aes_key_bytes, 16);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "rsa:\n  p: 61\n  q: 53\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.rsa.p, 61);
        assert_eq!(loaded.rsa.random_prime_bits, 32);
        assert_eq!(loaded.keygen.aes_key_bytes, 32);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("CIPHERKIT_TEST_SUBST_Q", "1013");
        let content = "rsa:\n  q: ${CIPHERKIT_TEST_SUBST_Q}\n  p: ${CIPHERKIT_TEST_UNSET_VAR}\n";
        let substituted = Config::substitute_env_vars(content).unwrap();
        assert!(substituted.contains("q: 1013"));
        assert!(substituted.contains("${CIPHERKIT_TEST_UNSET_VAR}"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_AES_MODE, "ctr"),
            (ENV_OUTPUT_FORMAT, "not-a-format"),
            (ENV_LOG, "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.aes.mode, AesMode::Ctr);
        assert_eq!(config.aes.output_format, OutputFormat::Base64);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.keygen.aes_key_bytes = 20;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.rsa.q = config.rsa.p;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.rsa.p = 1000;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.rsa.random_prime_bits = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.rsa.q, 1009);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }
}
