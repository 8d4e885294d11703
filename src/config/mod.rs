/// Configuration management for Aksup - AKS agent pool scaling
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::azure::client::DEFAULT_MANAGEMENT_ENDPOINT;

/// Main tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target subscription identifier (a string UUID)
    pub subscription_id: String,

    /// Azure management plane configuration
    #[serde(default)]
    pub azure: AzureConfig,
}

/// Azure management plane access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    /// ARM bearer token (can also be set via AZURE_ARM_TOKEN env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// ARM endpoint; defaults to the public Azure cloud
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            token: None,
            management_endpoint: default_management_endpoint(),
        }
    }
}

fn default_management_endpoint() -> String {
    DEFAULT_MANAGEMENT_ENDPOINT.to_string()
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.subscription_id.is_empty() {
            anyhow::bail!("subscription_id cannot be empty");
        }

        let endpoint = url::Url::parse(&self.azure.management_endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid management endpoint URL: {}", e))?;
        if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
            anyhow::bail!(
                "Management endpoint must be an http(s) URL: {}",
                self.azure.management_endpoint
            );
        }

        Ok(())
    }

    /// Get the ARM bearer token from config or environment
    pub fn get_arm_token(&self) -> anyhow::Result<String> {
        self.azure
            .token
            .clone()
            .or_else(|| std::env::var("AZURE_ARM_TOKEN").ok())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "ARM bearer token not found. Set AZURE_ARM_TOKEN environment variable or specify in config"
                )
            })
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            subscription_id: "00000000-0000-0000-0000-000000000000".to_string(),
            azure: AzureConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::example();
        assert!(config.validate().is_ok());

        config.subscription_id = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        let mut config = AppConfig::example();

        config.azure.management_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        config.azure.management_endpoint = "ftp://management.azure.com".to_string();
        assert!(config.validate().is_err());

        config.azure.management_endpoint = "https://management.usgovcloudapi.net".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_round_trip() {
        let config = AppConfig::example();
        let yaml = serde_yaml::to_string(&config).expect("example should serialize");
        let parsed: AppConfig = serde_yaml::from_str(&yaml).expect("example should parse back");
        assert_eq!(parsed.subscription_id, config.subscription_id);
        assert_eq!(
            parsed.azure.management_endpoint,
            DEFAULT_MANAGEMENT_ENDPOINT
        );
    }

    #[test]
    fn test_inline_token_wins() {
        let mut config = AppConfig::example();
        config.azure.token = Some("inline-token".to_string());
        assert_eq!(config.get_arm_token().expect("token"), "inline-token");
    }
}
