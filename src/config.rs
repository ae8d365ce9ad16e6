//! Настройки движка (TOML).
//!
//! ```toml
//! turn_timeout_secs = 30
//! bot_think_delay_ms = 0
//! odd_chip_policy = "discard"
//!
//! [bot]
//! fold_probability = 0.7
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bot::BotProfile;
use crate::domain::hand::OddChipPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Не удалось прочитать {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Ошибка разбора конфига: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Некорректный конфиг: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Сколько секунд даётся на ход до авто-check/fold.
    pub turn_timeout_secs: u64,
    /// Искусственная пауза перед ходом бота (0: без паузы).
    pub bot_think_delay_ms: u64,
    pub odd_chip_policy: OddChipPolicy,
    pub bot: BotProfile,
    /// Предел ходов ботов подряд за один вызов.
    pub max_bot_actions_per_call: u32,
    /// Предел раздач за один проход турнирного цикла.
    pub max_hands_per_drive: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_timeout_secs: 30,
            bot_think_delay_ms: 0,
            odd_chip_policy: OddChipPolicy::Discard,
            bot: BotProfile::default(),
            max_bot_actions_per_call: 1_000,
            max_hands_per_drive: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_timeout_secs == 0 {
            return Err(ConfigError::Invalid("turn_timeout_secs = 0".into()));
        }
        if self.max_bot_actions_per_call == 0 {
            return Err(ConfigError::Invalid("max_bot_actions_per_call = 0".into()));
        }
        if self.max_hands_per_drive == 0 {
            return Err(ConfigError::Invalid("max_hands_per_drive = 0".into()));
        }
        self.bot.validate().map_err(ConfigError::Invalid)
    }
}
