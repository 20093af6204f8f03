//! Initialize device identity.

use anyhow::{Context, Result};
use pairsync_client::PeerSelection;
use std::path::Path;

use crate::config::DeviceConfig;

/// Run the init command.
pub async fn run(
    data_dir: &Path,
    name: &str,
    substrate: &Path,
    selection: PeerSelection,
) -> Result<()> {
    // Check if already initialized
    if DeviceConfig::exists(data_dir).await {
        anyhow::bail!(
            "Device already initialized. Delete {} to reinitialize.",
            data_dir.join("device.json").display()
        );
    }

    tokio::fs::create_dir_all(substrate)
        .await
        .context("Failed to create substrate directory")?;
    let substrate = tokio::fs::canonicalize(substrate)
        .await
        .context("Failed to resolve substrate directory")?;

    let config = DeviceConfig::new(name, &substrate).with_peer_selection(selection);
    config.save(data_dir).await?;

    println!("Device initialized successfully!");
    println!();
    println!("  Node ID:   {}", config.node_id);
    println!("  Name:      {}", config.device_name);
    println!("  Substrate: {}", config.substrate.display());
    println!("  Data dir:  {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Initialize the paired device with the same --substrate");
    println!("  2. Publish weather: pairsync publish --weather-id 800 --high 24 --low 13.5");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_creates_device_config() {
        let dir = tempdir().unwrap();
        let substrate = dir.path().join("shared");
        run(dir.path(), "Test Device", &substrate, PeerSelection::Last)
            .await
            .unwrap();

        assert!(dir.path().join("device.json").exists());
        assert!(substrate.is_dir());

        let config = DeviceConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.device_name, "Test Device");
        assert!(!config.node_id.is_empty());
        assert!(config.substrate.is_absolute());
    }

    #[tokio::test]
    async fn init_fails_if_already_initialized() {
        let dir = tempdir().unwrap();
        let substrate = dir.path().join("shared");

        // First init should succeed
        run(dir.path(), "Device 1", &substrate, PeerSelection::Last)
            .await
            .unwrap();

        // Second init should fail
        let result = run(dir.path(), "Device 2", &substrate, PeerSelection::Last).await;
        assert!(result.is_err());
    }
}
