use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::model::Settings;

/// Everything the binary reads from the environment, once, at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub admin_password: String,
    pub settings: Settings,
    pub compact_threshold: u64,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Self {
        let settings = Settings {
            weekday_price: parse_or("INNKEEP_WEEKDAY_PRICE", 10_000),
            weekend_price: parse_or("INNKEEP_WEEKEND_PRICE", 15_000),
            min_nights: parse_or("INNKEEP_MIN_NIGHTS", 1),
        };
        assert!(
            settings.weekday_price > 0 && settings.weekend_price > 0,
            "nightly prices must be positive"
        );
        assert!(settings.min_nights >= 1, "minimum stay must be at least one night");

        Self {
            bind: std::env::var("INNKEEP_BIND").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("INNKEEP_PORT", 3001),
            data_dir: PathBuf::from(
                std::env::var("INNKEEP_DATA_DIR").unwrap_or_else(|_| "./data".into()),
            ),
            admin_password: std::env::var("INNKEEP_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "innkeep".into()),
            settings,
            compact_threshold: parse_or("INNKEEP_COMPACT_THRESHOLD", 1000),
            metrics_port: std::env::var("INNKEEP_METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("calendar.wal")
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("invalid {key}={raw}: {e}; using default");
                default
            }
        },
        Err(_) => default,
    }
}
