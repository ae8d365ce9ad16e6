use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindLevel;
use crate::domain::chips::Chips;
use crate::domain::{HandId, PlayerId, TableId, TournamentId};

/// Индекс места за столом (0..max_seats-1).
pub type SeatIndex = u8;

/// Тип стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TableKind {
    Cash,
    Tournament,
}

/// Конфиг стола: сколько мест, какие ставки, рамки бай-ина.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    /// Максимальное количество мест за столом (2–9).
    pub max_seats: u8,
    pub kind: TableKind,
    /// Блайнды/анте кэш-стола. Турнирные столы получают уровень от турнира.
    pub stakes: BlindLevel,
    /// Минимальный бай-ин (кэш).
    pub min_buy_in: Chips,
    /// Максимальный бай-ин (кэш).
    pub max_buy_in: Chips,
}

impl TableConfig {
    pub fn cash(max_seats: u8, small_blind: u64, big_blind: u64) -> Self {
        Self {
            max_seats,
            kind: TableKind::Cash,
            stakes: BlindLevel::cash(small_blind, big_blind),
            min_buy_in: Chips(big_blind * 20),
            max_buy_in: Chips(big_blind * 200),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(2..=9).contains(&self.max_seats) {
            return Err(format!("TableConfig: max_seats must be in [2, 9], got {}", self.max_seats));
        }
        self.stakes.validate()?;
        if self.kind == TableKind::Cash && self.min_buy_in > self.max_buy_in {
            return Err("TableConfig: min_buy_in > max_buy_in".into());
        }
        Ok(())
    }
}

/// Занятое место: кто сидит и сколько у него фишек.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub player_id: PlayerId,
    pub stack: Chips,
    pub sitting_out: bool,
    pub is_bot: bool,
}

impl Seat {
    pub fn new(player_id: PlayerId, stack: Chips, is_bot: bool) -> Self {
        Self {
            player_id,
            stack,
            sitting_out: false,
            is_bot,
        }
    }

    /// Участвует в следующей раздаче.
    pub fn is_active(&self) -> bool {
        !self.sitting_out && !self.stack.is_zero()
    }
}

/// Основное состояние стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,

    /// Места за столом: индекс вектора = SeatIndex.
    /// None – место пустое.
    pub seats: Vec<Option<Seat>>,

    /// Позиция дилерской кнопки или None, если раздач ещё не было.
    pub dealer_button: Option<SeatIndex>,

    /// ID текущей незавершённой раздачи.
    pub current_hand_id: Option<HandId>,

    /// Сколько раздач сыграно за столом.
    pub hands_played: u64,

    /// Турнир, которому принадлежит стол (для турнирных столов).
    pub tournament_id: Option<TournamentId>,
}

impl Table {
    /// Создать пустой стол с заданной конфигурацией.
    pub fn new(id: TableId, name: String, config: TableConfig) -> Self {
        let seats = vec![None; config.max_seats as usize];
        Self {
            id,
            name,
            config,
            seats,
            dealer_button: None,
            current_hand_id: None,
            hands_played: 0,
            tournament_id: None,
        }
    }

    pub fn max_seats(&self) -> u8 {
        self.config.max_seats
    }

    pub fn seated_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    /// Игроки, которые примут участие в следующей раздаче.
    pub fn active_count(&self) -> usize {
        self.seats
            .iter()
            .flatten()
            .filter(|s| s.is_active())
            .count()
    }

    pub fn hand_in_progress(&self) -> bool {
        self.current_hand_id.is_some()
    }

    pub fn first_empty_seat(&self) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| s.is_none())
            .map(|i| i as SeatIndex)
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| s.as_ref().map(|p| p.player_id) == Some(player_id))
            .map(|i| i as SeatIndex)
    }

    pub fn seat(&self, index: SeatIndex) -> Option<&Seat> {
        self.seats.get(index as usize).and_then(|s| s.as_ref())
    }

    pub fn seat_mut(&mut self, index: SeatIndex) -> Option<&mut Seat> {
        self.seats.get_mut(index as usize).and_then(|s| s.as_mut())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.seats.iter().flatten().map(|s| s.player_id).collect()
    }

    pub fn total_chips(&self) -> Chips {
        self.seats.iter().flatten().map(|s| s.stack).sum()
    }
}
