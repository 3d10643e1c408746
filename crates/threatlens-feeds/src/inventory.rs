//! TOML-backed asset inventory
//!
//! The inventory file is a list of `[[asset]]` tables:
//!
//! ```toml
//! [[asset]]
//! hostname = "PROD-SP-01"
//! vendor = "Microsoft"
//! product = "SharePoint"
//! version = "2019"
//! environment = "production"
//! criticality = "high"
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use threatlens_core::{Asset, AssetInventory, Error, Result};
use tracing::info;

/// Asset inventory loaded once from a TOML file
#[derive(Debug)]
pub struct FileInventory {
    assets: Vec<Asset>,
}

impl FileInventory {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let inventory = Self::from_toml(&raw)?;
        info!(
            path = %path.display(),
            assets = inventory.assets.len(),
            "asset inventory loaded"
        );
        Ok(inventory)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: InventoryFile = toml::from_str(raw)
            .map_err(|e| Error::Configuration(format!("invalid inventory file: {}", e)))?;
        Ok(Self::from_assets(file.asset))
    }

    pub fn from_assets(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

#[async_trait]
impl AssetInventory for FileInventory {
    async fn list(&self) -> Result<Vec<Asset>> {
        Ok(self.assets.clone())
    }
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    asset: Vec<Asset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatlens_core::{Criticality, Environment};

    #[tokio::test]
    async fn test_parse_inventory_file() {
        let inventory = FileInventory::from_toml(
            r#"
            [[asset]]
            hostname = "PROD-SP-01"
            vendor = "Microsoft"
            product = "SharePoint"
            version = "2019"
            environment = "production"
            criticality = "high"

            [[asset]]
            hostname = "DEV-TC-01"
            vendor = "Apache"
            product = "Tomcat"
            version = "9.0.50"
            "#,
        )
        .unwrap();

        let assets = inventory.list().await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].hostname, "PROD-SP-01");
        assert_eq!(assets[0].environment, Environment::Production);
        assert_eq!(assets[0].criticality, Criticality::High);

        // Tags default to the least-exposed values when omitted
        assert_eq!(assets[1].environment, Environment::Development);
        assert_eq!(assets[1].criticality, Criticality::Medium);
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_inventory() {
        let inventory = FileInventory::from_toml("").unwrap();
        assert!(inventory.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let err = FileInventory::from_toml("[[asset]]\nhostname = 12").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
