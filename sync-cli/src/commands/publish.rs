//! Publish weather fields to the shared document.

use anyhow::{Context, Result};
use pairsync_client::{Document, WeatherInfo};
use pairsync_types::{KEY_HIGH_TEMP, KEY_LOW_TEMP, KEY_WEATHER_ID};
use std::path::Path;

use crate::commands;
use crate::config::DeviceConfig;

/// Fields given on the command line. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherFields {
    /// Weather condition code.
    pub weather_id: Option<i32>,
    /// Daily high temperature.
    pub high_temp: Option<f64>,
    /// Daily low temperature.
    pub low_temp: Option<f64>,
}

impl WeatherFields {
    /// All three fields, if every one was given.
    fn complete(&self) -> Option<WeatherInfo> {
        Some(WeatherInfo::new(
            self.weather_id?,
            self.high_temp?,
            self.low_temp?,
        ))
    }

    /// The given fields as a partial document.
    fn to_document(self) -> Document {
        let mut doc = Document::new();
        if let Some(id) = self.weather_id {
            doc.put_int(KEY_WEATHER_ID, i64::from(id));
        }
        if let Some(high) = self.high_temp {
            doc.put_double(KEY_HIGH_TEMP, high);
        }
        if let Some(low) = self.low_temp {
            doc.put_double(KEY_LOW_TEMP, low);
        }
        doc
    }
}

/// Run the publish command.
pub async fn run(data_dir: &Path, fields: WeatherFields) -> Result<()> {
    let device = DeviceConfig::load(data_dir).await?;

    let update = fields.to_document();
    if update.is_empty() {
        anyhow::bail!("Nothing to publish. Pass --weather-id, --high and/or --low.");
    }

    let sync = commands::connect(&device).await?;
    let item = match fields.complete() {
        Some(info) => sync.publish_weather(info).await,
        None => sync.publish_document(update).await,
    }
    .context("Failed to publish")?;

    let stored = item.document().context("Stored document is unreadable")?;

    println!("Publish successful!");
    println!();
    println!("  Address:  {}", item.address);
    println!("  Document: {}", stored);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairsync_client::PeerSelection;
    use tempfile::tempdir;

    async fn setup_device(dir: &Path) -> DeviceConfig {
        let device = DeviceConfig::new("Test Device", &dir.join("shared"));
        device.save(dir).await.unwrap();
        device
    }

    #[test]
    fn complete_requires_all_fields() {
        let partial = WeatherFields {
            high_temp: Some(85.0),
            ..Default::default()
        };
        assert!(partial.complete().is_none());
        assert_eq!(partial.to_document().len(), 1);

        let full = WeatherFields {
            weather_id: Some(800),
            high_temp: Some(24.0),
            low_temp: Some(13.5),
        };
        assert_eq!(full.complete(), Some(WeatherInfo::new(800, 24.0, 13.5)));
        assert_eq!(full.to_document(), WeatherInfo::new(800, 24.0, 13.5).to_document());
    }

    #[tokio::test]
    async fn publish_requires_device() {
        let dir = tempdir().unwrap();
        let fields = WeatherFields {
            weather_id: Some(1),
            ..Default::default()
        };
        assert!(run(dir.path(), fields).await.is_err());
    }

    #[tokio::test]
    async fn publish_requires_a_field() {
        let dir = tempdir().unwrap();
        setup_device(dir.path()).await;

        let err = run(dir.path(), WeatherFields::default()).await.unwrap_err();
        assert!(err.to_string().contains("Nothing to publish"), "got: {}", err);
    }

    #[tokio::test]
    async fn partial_publish_keeps_other_fields() {
        let dir = tempdir().unwrap();
        let device = setup_device(dir.path()).await;

        run(
            dir.path(),
            WeatherFields {
                weather_id: Some(1),
                high_temp: Some(80.0),
                low_temp: Some(60.0),
            },
        )
        .await
        .unwrap();
        run(
            dir.path(),
            WeatherFields {
                high_temp: Some(85.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let sync = commands::connect(&device.with_peer_selection(PeerSelection::Last))
            .await
            .unwrap();
        let doc = sync.fetch_local().await.unwrap();
        assert_eq!(doc.get_int(KEY_WEATHER_ID), Some(1));
        assert_eq!(doc.get_double(KEY_HIGH_TEMP), Some(85.0));
        assert_eq!(doc.get_double(KEY_LOW_TEMP), Some(60.0));
    }
}
