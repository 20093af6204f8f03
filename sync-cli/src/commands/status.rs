//! Show sync status.

use anyhow::Result;
use pairsync_client::Transport;
use std::path::Path;

use crate::commands;
use crate::config::{now_secs, DeviceConfig};

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    println!("=== pairsync status ===");
    println!();

    // Check device
    let device = match DeviceConfig::load(data_dir).await {
        Ok(device) => {
            println!("Device:");
            println!("  ID:        {}", device.node_id);
            println!("  Name:      {}", device.device_name);
            println!("  Init:      {}", format_timestamp(device.created_at));
            println!("  Substrate: {}", device.substrate.display());
            println!("  Peer rule: {:?}", device.peer_selection);
            device
        }
        Err(_) => {
            println!("Device: NOT INITIALIZED");
            println!();
            println!("Run 'pairsync init --name <name> --substrate <dir>' to initialize.");
            return Ok(());
        }
    };

    println!();

    let sync = match commands::connect(&device).await {
        Ok(sync) => sync,
        Err(e) => {
            println!("Connection:");
            println!("  Status: OFFLINE ({:#})", e);
            return Ok(());
        }
    };

    println!("Connection:");
    println!(
        "  Status: {}",
        if sync.transport().is_connected() {
            "REGISTERED"
        } else {
            "OFFLINE"
        }
    );

    let peers = sync.transport().connected_nodes().await?;
    println!("  Peers:  {} connected", peers.len());
    for node in peers.iter() {
        let proximity = if node.nearby { "nearby" } else { "remote" };
        println!("    {} ({}, {})", node.id, node.display_name, proximity);
    }

    println!();

    let local = sync.fetch_local().await?;
    println!("Local document:");
    if local.is_empty() {
        println!("  (empty)");
    } else {
        println!("  {}", local);
    }

    Ok(())
}

/// Format a Unix timestamp as a human-readable string.
fn format_timestamp(ts: u64) -> String {
    let diff = now_secs().saturating_sub(ts);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}
