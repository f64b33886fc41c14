use anyhow::{bail, Context, Result};
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted listing lifetime
pub const MAX_LISTING_TTL_DAYS: i64 = 3650;
/// Longest accepted refresh period (one day)
pub const MAX_REFRESH_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// Runtime settings for a listing store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage slot holding the serialized listing collection
    pub listings_key: String,
    /// Storage slot holding the display language code
    pub language_key: String,
    /// Name of the cross-context sync channel
    pub sync_channel: String,
    /// Admin WhatsApp number (without country code)
    pub admin_whatsapp: String,
    /// Country calling code prefixed to the admin number
    pub country_code: String,
    /// How often the store re-reads storage and recomputes expiry
    pub refresh_interval_ms: u64,
    /// How long a listing stays active after creation
    pub listing_ttl_days: i64,
    /// Maximum declared size per image
    pub max_image_bytes: u64,
    /// Maximum declared size of the video
    pub max_video_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            listings_key: "maadugal_listings".to_string(),
            language_key: "lang".to_string(),
            sync_channel: "maadugal_listings".to_string(),
            admin_whatsapp: "7904825836".to_string(),
            country_code: "91".to_string(),
            refresh_interval_ms: 60 * 1000,
            listing_ttl_days: 30,
            max_image_bytes: 5 * 1024 * 1024,
            max_video_bytes: 100 * 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject durations the store cannot schedule or date-stamp
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LISTING_TTL_DAYS).contains(&self.listing_ttl_days) {
            bail!(
                "listing_ttl_days must be between 1 and {}, got {}",
                MAX_LISTING_TTL_DAYS,
                self.listing_ttl_days
            );
        }
        if !(1..=MAX_REFRESH_INTERVAL_MS).contains(&self.refresh_interval_ms) {
            bail!(
                "refresh_interval_ms must be between 1 and {}, got {}",
                MAX_REFRESH_INTERVAL_MS,
                self.refresh_interval_ms
            );
        }
        Ok(())
    }

    /// Load settings from `path` when it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_json_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Refresh period, clamped to `1..=MAX_REFRESH_INTERVAL_MS`
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.clamp(1, MAX_REFRESH_INTERVAL_MS))
    }

    /// Listing lifetime, clamped to `1..=MAX_LISTING_TTL_DAYS` days
    pub fn listing_ttl(&self) -> ChronoDuration {
        ChronoDuration::days(self.listing_ttl_days.clamp(1, MAX_LISTING_TTL_DAYS))
    }

    /// Whole megabytes, as shown in validation messages
    pub fn max_image_mb(&self) -> u64 {
        self.max_image_bytes / (1024 * 1024)
    }

    pub fn max_video_mb(&self) -> u64 {
        self.max_video_bytes / (1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_marketplace_constants() {
        let config = StoreConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.listing_ttl(), ChronoDuration::days(30));
        assert_eq!(config.max_image_mb(), 5);
        assert_eq!(config.max_video_mb(), 100);
        assert_eq!(config.listings_key, "maadugal_listings");
        assert_eq!(config.language_key, "lang");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"admin_whatsapp": "9000000000", "refresh_interval_ms": 500}}"#)
            .expect("write config");

        let config = StoreConfig::from_json_file(file.path()).expect("load config");
        assert_eq!(config.admin_whatsapp, "9000000000");
        assert_eq!(config.refresh_interval(), Duration::from_millis(500));
        assert_eq!(config.listing_ttl_days, 30);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = StoreConfig::load_or_default(&dir.path().join("absent.json"))
            .expect("defaults");
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write config");
        assert!(StoreConfig::from_json_file(file.path()).is_err());
    }

    #[test]
    fn out_of_range_durations_are_rejected_on_load() {
        for body in [
            r#"{"listing_ttl_days": 9223372036854775807}"#,
            r#"{"listing_ttl_days": 0}"#,
            r#"{"refresh_interval_ms": 18446744073709551615}"#,
        ] {
            let mut file = tempfile::NamedTempFile::new().expect("temp file");
            write!(file, "{}", body).expect("write config");
            let err = StoreConfig::from_json_file(file.path()).expect_err(body);
            assert!(format!("{:#}", err).contains("must be between"), "{:#}", err);
        }
    }

    #[test]
    fn accessors_clamp_hand_built_values() {
        let config = StoreConfig {
            listing_ttl_days: i64::MAX,
            refresh_interval_ms: u64::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.listing_ttl(), ChronoDuration::days(MAX_LISTING_TTL_DAYS));
        assert_eq!(
            config.refresh_interval(),
            Duration::from_millis(MAX_REFRESH_INTERVAL_MS)
        );

        let config = StoreConfig {
            listing_ttl_days: -5,
            refresh_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.listing_ttl(), ChronoDuration::days(1));
        assert_eq!(config.refresh_interval(), Duration::from_millis(1));
    }
}
