// src/domain/tournament.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::blinds::{BlindLevel, BlindSchedule};
use crate::domain::chips::Chips;
use crate::domain::table::SeatIndex;
use crate::domain::{PlayerId, TableId, TournamentId};
use crate::engine::errors::PokerError;

/// Призовая структура: `percents[i]`: доля пула (в процентах) для места i+1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrizeStructure {
    pub percents: Vec<u32>,
}

impl PrizeStructure {
    pub fn winner_takes_all() -> Self {
        Self { percents: vec![100] }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.percents.is_empty() {
            return Err("PrizeStructure: no paid places".into());
        }
        let total: u32 = self.percents.iter().sum();
        if total > 100 {
            return Err(format!("PrizeStructure: percents sum to {total} > 100"));
        }
        Ok(())
    }

    /// Доля места `place` (1-based) из пула, с округлением вниз.
    pub fn prize_for_place(&self, place: u32, pool: Chips) -> Chips {
        match place.checked_sub(1).and_then(|i| self.percents.get(i as usize)) {
            Some(&pct) => pool.percent_floor(pct),
            None => Chips::ZERO,
        }
    }
}

/// Конфигурация турнира (sit-n-go).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentConfig {
    pub name: String,
    /// Бай-ин в валюте леджера, идёт в призовой пул.
    pub buy_in: Chips,
    /// Стартовый стек в турнирных фишках.
    pub starting_stack: Chips,
    pub min_players: u32,
    pub max_players: u32,
    /// Размер стола (2–9).
    pub table_size: u8,
    pub blind_schedule: BlindSchedule,
    pub prizes: PrizeStructure,
    /// Допустимая разница по числу игроков между столами.
    #[serde(default = "default_max_seat_diff")]
    pub max_seat_diff: u8,
}

fn default_max_seat_diff() -> u8 {
    1
}

impl TournamentConfig {
    /// Жёсткая валидация конфига турнира.
    pub fn validate(&self) -> Result<(), PokerError> {
        let invalid = |m: String| Err(PokerError::Validation(m));

        if self.name.trim().is_empty() {
            return invalid("TournamentConfig: name is empty".into());
        }
        if self.starting_stack.is_zero() {
            return invalid("TournamentConfig: starting_stack = 0".into());
        }
        if self.min_players < 2 {
            return invalid("TournamentConfig: min_players < 2".into());
        }
        if self.min_players > self.max_players {
            return invalid("TournamentConfig: min_players > max_players".into());
        }
        if !(2..=9).contains(&self.table_size) {
            return invalid("TournamentConfig: table_size must be in [2, 9]".into());
        }
        if self.max_seat_diff == 0 {
            return invalid("TournamentConfig: max_seat_diff = 0".into());
        }
        self.blind_schedule.validate().map_err(PokerError::Validation)?;
        self.prizes.validate().map_err(PokerError::Validation)?;
        Ok(())
    }
}

/// Статус турнира.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentStatus {
    Registration,
    Running,
    Completed,
    Cancelled,
}

/// Игрок в турнире (регистрация).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub player_id: PlayerId,
    pub is_bot: bool,
    pub table_id: Option<TableId>,
    pub seat: Option<SeatIndex>,
    pub eliminated: bool,
    /// Итоговое место (1 = победитель).
    pub finishing_place: Option<u32>,
}

/// Строка итоговой таблицы.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub place: u32,
    pub player_id: PlayerId,
    pub prize: Chips,
}

/// Основной объект турнира.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
    pub registrations: BTreeMap<PlayerId, Registration>,
    /// Индекс текущего уровня в `config.blind_schedule`.
    pub current_level: usize,
    pub next_blind_increase_at: Option<u64>,
    pub prize_pool: Chips,
    pub table_ids: Vec<TableId>,
    /// Порядок вылета: первый вылетевший: первый в списке.
    pub elimination_order: Vec<PlayerId>,
    pub standings: Vec<Standing>,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
}

impl Tournament {
    pub fn new(id: TournamentId, config: TournamentConfig) -> Result<Self, PokerError> {
        config.validate()?;

        Ok(Self {
            id,
            config,
            status: TournamentStatus::Registration,
            registrations: BTreeMap::new(),
            current_level: 0,
            next_blind_increase_at: None,
            prize_pool: Chips::ZERO,
            table_ids: Vec::new(),
            elimination_order: Vec::new(),
            standings: Vec::new(),
            started_at: None,
            completed_at: None,
        })
    }

    pub fn current_blinds(&self) -> Result<&BlindLevel, PokerError> {
        self.config
            .blind_schedule
            .level(self.current_level)
            .ok_or(PokerError::Internal("current_level вне расписания"))
    }

    pub fn ensure_status(&self, expected: TournamentStatus) -> Result<(), PokerError> {
        if self.status != expected {
            return Err(PokerError::InvalidTournamentStatus {
                tournament_id: self.id,
                expected,
                found: self.status,
            });
        }
        Ok(())
    }

    /// Проверки регистрации без изменения состояния.
    pub fn check_can_register(&self, player_id: PlayerId) -> Result<(), PokerError> {
        self.ensure_status(TournamentStatus::Registration)?;
        if self.registrations.contains_key(&player_id) {
            return Err(PokerError::AlreadyRegistered {
                player_id,
                tournament_id: self.id,
            });
        }
        if self.registrations.len() as u32 >= self.config.max_players {
            return Err(PokerError::TournamentFull(self.id));
        }
        Ok(())
    }

    /// Регистрируем игрока (после успешного списания бай-ина).
    pub fn register_player(&mut self, player_id: PlayerId, is_bot: bool) -> Result<(), PokerError> {
        self.check_can_register(player_id)?;
        self.registrations.insert(
            player_id,
            Registration {
                player_id,
                is_bot,
                table_id: None,
                seat: None,
                eliminated: false,
                finishing_place: None,
            },
        );
        self.prize_pool += self.config.buy_in;
        Ok(())
    }

    pub fn check_can_unregister(&self, player_id: PlayerId) -> Result<(), PokerError> {
        self.ensure_status(TournamentStatus::Registration)?;
        if !self.registrations.contains_key(&player_id) {
            return Err(PokerError::NotRegistered {
                player_id,
                tournament_id: self.id,
            });
        }
        Ok(())
    }

    pub fn unregister_player(&mut self, player_id: PlayerId) -> Result<(), PokerError> {
        self.check_can_unregister(player_id)?;
        self.registrations.remove(&player_id);
        self.prize_pool -= self.config.buy_in;
        Ok(())
    }

    /// Активные (не вылетевшие) игроки.
    pub fn remaining_players(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.values().filter(|r| !r.eliminated)
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining_players().count()
    }

    /// Проверки вылета. Возвращает место, которое займёт игрок.
    pub fn check_can_eliminate(&self, player_id: PlayerId) -> Result<u32, PokerError> {
        self.ensure_status(TournamentStatus::Running)?;

        let reg = self.registrations.get(&player_id).ok_or(PokerError::NotRegistered {
            player_id,
            tournament_id: self.id,
        })?;
        if reg.eliminated {
            return Err(PokerError::AlreadyEliminated {
                player_id,
                tournament_id: self.id,
            });
        }

        // Нельзя выбивать последнего игрока.
        let remaining = self.remaining_count() as u32;
        if remaining <= 1 {
            return Err(PokerError::Validation(format!(
                "нельзя выбить последнего игрока турнира {}",
                self.id
            )));
        }
        Ok(remaining)
    }

    /// Пометить вылет. Место = число оставшихся игроков до вылета.
    pub fn mark_eliminated(&mut self, player_id: PlayerId) -> Result<u32, PokerError> {
        let place = self.check_can_eliminate(player_id)?;

        if let Some(reg) = self.registrations.get_mut(&player_id) {
            reg.eliminated = true;
            reg.finishing_place = Some(place);
            reg.table_id = None;
            reg.seat = None;
        }
        self.elimination_order.push(player_id);
        Ok(place)
    }

    /// Перейти на следующий уровень, если пора. Возвращает новый индекс уровня.
    ///
    /// После последнего уровня: no-op.
    pub fn advance_level_if_due(&mut self, now: u64) -> Option<usize> {
        if self.status != TournamentStatus::Running {
            return None;
        }
        let due = self.next_blind_increase_at?;
        if now < due || self.current_level >= self.config.blind_schedule.last_index() {
            return None;
        }
        self.current_level += 1;
        self.next_blind_increase_at = self
            .config
            .blind_schedule
            .level(self.current_level)
            .filter(|_| self.current_level < self.config.blind_schedule.last_index())
            .map(|lvl| now + lvl.duration_secs);
        Some(self.current_level)
    }

    /// Итоговый порядок мест: единственный выживший: 1-й,
    /// дальше в обратном порядке вылета.
    pub fn finishing_order(&self) -> Vec<PlayerId> {
        let mut order: Vec<PlayerId> = self.remaining_players().map(|r| r.player_id).collect();
        order.extend(self.elimination_order.iter().rev().copied());
        order
    }
}
