//! Fetch the shared document.

use anyhow::{Context, Result};
use pairsync_client::{FetchSource, SyncOptions};
use std::path::Path;
use std::time::Duration;

use crate::commands;
use crate::config::DeviceConfig;

/// Run the fetch command.
///
/// With `from_peer`, reads from the connected peer and mirrors the result
/// locally; otherwise reads this device's own mirror.
pub async fn run(data_dir: &Path, from_peer: bool, timeout_secs: Option<u64>) -> Result<()> {
    let device = DeviceConfig::load(data_dir).await?;

    let mut sync = commands::connect(&device).await?;
    if let Some(secs) = timeout_secs {
        let options: SyncOptions = sync.options().clone();
        sync = sync.with_options(options.with_fetch_timeout(Duration::from_secs(secs)));
    }

    let source = if from_peer {
        FetchSource::ConnectedPeer
    } else {
        FetchSource::Local
    };
    let config = sync.fetch(source).await.context("Fetch failed")?;

    if config.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairsync_client::{Transport, WeatherInfo};
    use tempfile::tempdir;

    #[tokio::test]
    async fn fetch_requires_device() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), false, None).await.is_err());
    }

    #[tokio::test]
    async fn fetch_empty_substrate_succeeds() {
        let dir = tempdir().unwrap();
        let device = DeviceConfig::new("Test Device", &dir.path().join("shared"));
        device.save(dir.path()).await.unwrap();

        run(dir.path(), false, None).await.unwrap();
        run(dir.path(), true, Some(5)).await.unwrap();
    }

    #[tokio::test]
    async fn fetch_from_peer_mirrors_locally() {
        let dir = tempdir().unwrap();
        let shared = dir.path().join("shared");
        let phone_dir = dir.path().join("phone");
        tokio::fs::create_dir_all(&phone_dir).await.unwrap();

        let watch = DeviceConfig::new("Watch", &shared);
        watch.save(dir.path()).await.unwrap();
        let phone = DeviceConfig::new("Phone", &shared);
        phone.save(&phone_dir).await.unwrap();

        commands::connect(&phone)
            .await
            .unwrap()
            .publish_weather(WeatherInfo::new(200, 75.0, 55.0))
            .await
            .unwrap();

        run(dir.path(), true, None).await.unwrap();

        let sync = commands::connect(&watch).await.unwrap();
        assert!(sync.transport().is_connected());
        assert_eq!(
            sync.fetch_local().await.unwrap(),
            WeatherInfo::new(200, 75.0, 55.0).to_document()
        );
    }
}
