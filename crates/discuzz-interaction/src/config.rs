//! Configuration file management for Discuzz gateways.
//!
//! Supports reading vendor secrets from `~/.config/discuzz/secret.json`.
//! Library consumers normally inject credentials explicitly at gateway
//! construction; this loader exists for binaries and local development.

pub mod secrets {
    use serde::Deserialize;
    use std::fs;
    use std::path::PathBuf;

    /// Root structure of secret.json
    #[derive(Debug, Clone, Deserialize)]
    pub struct SecretConfig {
        #[serde(default)]
        pub gemini: Option<VendorConfig>,
        #[serde(default)]
        pub openai: Option<VendorConfig>,
    }

    /// Per-vendor API configuration
    #[derive(Debug, Clone, Deserialize)]
    pub struct VendorConfig {
        pub api_key: String,
        #[serde(default)]
        pub model_name: Option<String>,
    }

    /// Loads the secret configuration file from ~/.config/discuzz/secret.json
    pub fn load() -> Result<SecretConfig, String> {
        let config_path = config_path()?;

        if !config_path.exists() {
            return Err(format!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            format!(
                "Failed to read configuration file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            format!(
                "Failed to parse configuration file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    fn config_path() -> Result<PathBuf, String> {
        let home =
            dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
        Ok(home.join(".config").join("discuzz").join("secret.json"))
    }

}
