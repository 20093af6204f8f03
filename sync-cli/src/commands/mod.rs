//! CLI command implementations.

pub mod fetch;
pub mod init;
pub mod publish;
pub mod status;

use anyhow::{Context, Result};
use pairsync_client::{ConfigSync, DirTransport, SyncOptions, Transport};

use crate::config::DeviceConfig;

/// Register this device on its substrate and build a client over it.
pub async fn connect(device: &DeviceConfig) -> Result<ConfigSync<DirTransport>> {
    tracing::debug!(
        "Connecting {} via {}",
        device.node_id,
        device.substrate.display()
    );
    let transport = DirTransport::new(&device.substrate, device.node());
    transport
        .connect()
        .await
        .with_context(|| format!("Failed to register on {}", device.substrate.display()))?;

    let options = SyncOptions::default().with_peer_selection(device.peer_selection);
    Ok(ConfigSync::new(transport).with_options(options))
}
