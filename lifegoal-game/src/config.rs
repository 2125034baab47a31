//! Aggregated tuning for every reward subsystem.
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignConfig;
use crate::journal::JournalConfig;
use crate::lucky_roll::LuckyRollConfig;
use crate::pomodoro::PomodoroConfig;
use crate::wheel::WheelConfig;

/// Trait for abstracting configuration loading.
/// Platform-specific implementations should provide this.
pub trait ConfigSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the configuration document called `config_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or cannot be parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lucky_roll: LuckyRollConfig,
    pub pomodoro: PomodoroConfig,
    pub journal: JournalConfig,
    pub wheel: WheelConfig,
    pub campaign: CampaignConfig,
}

impl GameConfig {
    /// Parse a possibly partial JSON document; omitted sections and fields
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong
    /// type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load each section from `source`, keeping defaults for sections that
    /// fail to load.
    pub fn load<S: ConfigSource>(source: &S) -> Self {
        Self {
            lucky_roll: load_section(source, "lucky_roll"),
            pomodoro: load_section(source, "pomodoro"),
            journal: load_section(source, "journal"),
            wheel: load_section(source, "wheel"),
            campaign: load_section(source, "campaign"),
        }
    }
}

fn load_section<S, T>(source: &S, name: &str) -> T
where
    S: ConfigSource,
    T: DeserializeOwned + Default,
{
    source.load_config(name).unwrap_or_else(|err| {
        warn!("using default {name} config: {err}");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    enum FixtureError {
        #[error("missing config {0}")]
        Missing(String),
        #[error(transparent)]
        Json(#[from] serde_json::Error),
    }

    struct FixtureSource(HashMap<&'static str, &'static str>);

    impl ConfigSource for FixtureSource {
        type Error = FixtureError;

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let raw = self
                .0
                .get(config_name)
                .ok_or_else(|| FixtureError::Missing(config_name.to_string()))?;
            Ok(serde_json::from_str(raw)?)
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{ "pomodoro": { "gold_per_minute": 5 } }"#).unwrap();
        assert_eq!(cfg.pomodoro.gold_per_minute, 5);
        assert_eq!(
            cfg.pomodoro.allowed_minutes,
            PomodoroConfig::default().allowed_minutes
        );
        assert_eq!(cfg.wheel, WheelConfig::default());
    }

    #[test]
    fn source_sections_fall_back_individually() {
        let source = FixtureSource(HashMap::from([
            ("journal", r#"{ "min_chars": 5 }"#),
            ("wheel", "not json"),
        ]));
        let cfg = GameConfig::load(&source);
        assert_eq!(cfg.journal.min_chars, 5);
        assert_eq!(cfg.wheel, WheelConfig::default());
        assert_eq!(cfg.lucky_roll, LuckyRollConfig::default());
    }
}
