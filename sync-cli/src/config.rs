//! Configuration management for pairsync.

use anyhow::{Context, Result};
use pairsync_client::{Node, NodeId, PeerSelection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEVICE_FILE: &str = "device.json";

/// Device configuration stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Node id this device registers under.
    pub node_id: String,
    /// Human-readable device name.
    pub device_name: String,
    /// When the device was initialized.
    pub created_at: u64,
    /// Shared directory acting as the sync substrate.
    pub substrate: PathBuf,
    /// Which connected peer to read from.
    #[serde(default)]
    pub peer_selection: PeerSelection,
}

impl DeviceConfig {
    /// Create a new device configuration with a fresh node id.
    pub fn new(name: &str, substrate: &Path) -> Self {
        Self {
            node_id: NodeId::random().to_string(),
            device_name: name.to_string(),
            created_at: now_secs(),
            substrate: substrate.to_path_buf(),
            peer_selection: PeerSelection::default(),
        }
    }

    /// Set the peer selection rule.
    pub fn with_peer_selection(mut self, selection: PeerSelection) -> Self {
        self.peer_selection = selection;
        self
    }

    /// The node this device appears as on the substrate.
    pub fn node(&self) -> Node {
        Node::new(self.node_id.as_str(), &self.device_name)
    }

    /// Load device configuration from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Device not initialized. Run 'pairsync init' first.")?;
        serde_json::from_str(&contents).context("Invalid device configuration")
    }

    /// Save device configuration to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save device configuration")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if device is initialized.
    pub async fn exists(data_dir: &Path) -> bool {
        tokio::fs::try_exists(data_dir.join(DEVICE_FILE))
            .await
            .unwrap_or(false)
    }
}

/// Seconds since the Unix epoch (0 if the clock is before it).
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn device_config_roundtrip() {
        let dir = tempdir().unwrap();
        let config = DeviceConfig::new("Phone", Path::new("/mnt/shared"))
            .with_peer_selection(PeerSelection::PreferNearby);
        config.save(dir.path()).await.unwrap();

        let loaded = DeviceConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.node_id, config.node_id);
        assert_eq!(loaded.device_name, "Phone");
        assert_eq!(loaded.substrate, PathBuf::from("/mnt/shared"));
        assert_eq!(loaded.peer_selection, PeerSelection::PreferNearby);
        assert_eq!(loaded.node().id, NodeId::new(&config.node_id));
    }

    #[tokio::test]
    async fn missing_peer_selection_defaults_to_last() {
        let dir = tempdir().unwrap();
        let json = r#"{
            "node_id": "4c8a2f0d",
            "device_name": "Watch",
            "created_at": 0,
            "substrate": "/mnt/shared"
        }"#;
        tokio::fs::write(dir.path().join(DEVICE_FILE), json)
            .await
            .unwrap();

        let loaded = DeviceConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded.peer_selection, PeerSelection::Last);
    }

    #[tokio::test]
    async fn load_without_init_fails() {
        let dir = tempdir().unwrap();
        assert!(!DeviceConfig::exists(dir.path()).await);

        let err = DeviceConfig::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("pairsync init"), "got: {}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn device_config_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let config = DeviceConfig::new("Phone", dir.path());
        config.save(dir.path()).await.unwrap();

        let path = dir.path().join(DEVICE_FILE);
        let perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "file should be 0600");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn data_dir_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("test-data");
        tokio::fs::create_dir_all(&data_dir).await.unwrap();
        set_dir_permissions_0700(&data_dir).await.unwrap();

        let perms = tokio::fs::metadata(&data_dir).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o700, "dir should be 0700");
    }
}
