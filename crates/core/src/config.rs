use serde::Deserialize;
use std::path::Path;

use crate::error::{PointPulseError, PointPulseResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `POINTPULSE__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub payload: PayloadConfig,
    #[serde(default)]
    pub points: PointsConfig,
}

// ─── Payload Codec Config ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadConfig {
    /// Value of the `type` field stamped on every encoded payload.
    #[serde(default = "default_type_tag")]
    pub type_tag: String,
    /// Query parameter carrying an encoded payload inside a link.
    #[serde(default = "default_data_key")]
    pub data_key: String,
    /// Query parameter carrying a bare redemption id inside a link.
    #[serde(default = "default_redemption_key")]
    pub redemption_key: String,
}

fn default_type_tag() -> String {
    "pointpulse".to_string()
}
fn default_data_key() -> String {
    "data".to_string()
}
fn default_redemption_key() -> String {
    "redemptionId".to_string()
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            type_tag: default_type_tag(),
            data_key: default_data_key(),
            redemption_key: default_redemption_key(),
        }
    }
}

// ─── Points Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PointsConfig {
    /// Purchase cents required for one base point (25 = 1 point per $0.25).
    #[serde(default = "default_cents_per_point")]
    pub cents_per_point: u32,
}

fn default_cents_per_point() -> u32 {
    25
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            cents_per_point: default_cents_per_point(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file, then environment
    /// variables (`POINTPULSE__POINTS__CENTS_PER_POINT=25`).
    pub fn load(path: Option<&Path>) -> PointPulseResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("POINTPULSE")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        if config.points.cents_per_point == 0 {
            return Err(PointPulseError::Config(
                "points.cents_per_point must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.payload.type_tag, "pointpulse");
        assert_eq!(config.payload.data_key, "data");
        assert_eq!(config.payload.redemption_key, "redemptionId");
        assert_eq!(config.points.cents_per_point, 25);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"points": {}, "payload": {"data_key": "d"}}"#).unwrap();
        assert_eq!(config.points.cents_per_point, 25);
        assert_eq!(config.payload.data_key, "d");
        assert_eq!(config.payload.type_tag, "pointpulse");
    }

    #[test]
    fn test_load_rejects_zero_cents_per_point() {
        let path = std::env::temp_dir().join(format!("pointpulse-{}.toml", std::process::id()));
        std::fs::write(&path, "[points]\ncents_per_point = 0\n").unwrap();
        let result = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PointPulseError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/pointpulse.toml"))).unwrap();
        assert_eq!(config.points.cents_per_point, 25);
    }
}
