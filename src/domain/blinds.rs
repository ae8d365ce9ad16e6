// src/domain/blinds.rs

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;

/// Один уровень блайндов.
/// Пример: SB = 100, BB = 200, ante = 25, duration_secs = 600.
///
/// Анте (если > 0) платит каждый игрок раздачи до блайндов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlindLevel {
    pub small_blind: Chips,
    pub big_blind: Chips,
    #[serde(default)]
    pub ante: Chips,
    /// Длительность уровня в секундах (для кэш-столов не используется).
    #[serde(default)]
    pub duration_secs: u64,
}

impl BlindLevel {
    pub fn new(small_blind: Chips, big_blind: Chips, ante: Chips, duration_secs: u64) -> Self {
        Self {
            small_blind,
            big_blind,
            ante,
            duration_secs,
        }
    }

    /// Уровень без анте и без длительности, удобно для кэш-столов.
    pub fn cash(small_blind: u64, big_blind: u64) -> Self {
        Self::new(Chips(small_blind), Chips(big_blind), Chips::ZERO, 0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind.is_zero() {
            return Err("BlindLevel: small_blind = 0".into());
        }
        if self.big_blind < self.small_blind {
            return Err(format!(
                "BlindLevel: big_blind ({}) < small_blind ({})",
                self.big_blind, self.small_blind
            ));
        }
        Ok(())
    }
}

/// Расписание уровней блайндов турнира.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlindSchedule {
    pub levels: Vec<BlindLevel>,
}

impl BlindSchedule {
    pub fn new(levels: Vec<BlindLevel>) -> Self {
        Self { levels }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.levels.is_empty() {
            return Err("BlindSchedule: empty levels".into());
        }
        for (idx, lvl) in self.levels.iter().enumerate() {
            lvl.validate().map_err(|e| format!("level {idx}: {e}"))?;
            if lvl.duration_secs == 0 {
                return Err(format!("BlindSchedule: level {idx} has duration 0"));
            }
        }
        Ok(())
    }

    pub fn level(&self, index: usize) -> Option<&BlindLevel> {
        self.levels.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Расписание sit-n-go по умолчанию: уровни по 10 минут, анте с третьего.
    pub fn standard_sng() -> Self {
        let levels = vec![
            BlindLevel::new(Chips(10), Chips(20), Chips::ZERO, 600),
            BlindLevel::new(Chips(15), Chips(30), Chips::ZERO, 600),
            BlindLevel::new(Chips(25), Chips(50), Chips(5), 600),
            BlindLevel::new(Chips(50), Chips(100), Chips(10), 600),
            BlindLevel::new(Chips(100), Chips(200), Chips(25), 600),
        ];

        BlindSchedule { levels }
    }
}
