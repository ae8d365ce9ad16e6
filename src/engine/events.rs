use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindLevel;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::{HandStatus, PotAward};
use crate::domain::tournament::Standing;
use crate::domain::{HandId, PlayerId, SeatIndex, TableId, TournamentId};
use crate::engine::actions::ActionKind;

/// Событие движка для внешней шины (веб-сокеты, лог, аналитика).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineEvent {
    /// Новая раздача началась.
    HandStarted {
        table_id: TableId,
        hand_id: HandId,
        hand_number: u64,
        dealer_seat: SeatIndex,
        small_blind_seat: SeatIndex,
        big_blind_seat: SeatIndex,
        players: Vec<PlayerId>,
    },

    /// Карманные карты. Адресовано только одному игроку.
    HoleCards {
        table_id: TableId,
        hand_id: HandId,
        player_id: PlayerId,
        cards: [Card; 2],
    },

    /// Действие игрока.
    ActionTaken {
        table_id: TableId,
        hand_id: HandId,
        player_id: PlayerId,
        kind: ActionKind,
        amount: Chips,
        pot_after: Chips,
    },

    /// Открыты общие карты.
    StreetDealt {
        table_id: TableId,
        hand_id: HandId,
        street: HandStatus,
        cards: Vec<Card>,
    },

    /// Раздача завершена, банк(и) выплачены.
    HandComplete {
        table_id: TableId,
        hand_id: HandId,
        awards: Vec<PotAward>,
        undistributed: Chips,
    },

    PlayerEliminated {
        tournament_id: TournamentId,
        player_id: PlayerId,
        place: u32,
    },

    BlindIncreased {
        tournament_id: TournamentId,
        level: usize,
        blinds: BlindLevel,
    },

    TournamentComplete {
        tournament_id: TournamentId,
        standings: Vec<Standing>,
    },
}

impl EngineEvent {
    /// Кому адресовано приватное событие. None: публичное.
    pub fn recipient(&self) -> Option<PlayerId> {
        match self {
            EngineEvent::HoleCards { player_id, .. } => Some(*player_id),
            _ => None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.recipient().is_some()
    }

    /// Стол, к которому относится событие.
    pub fn table_id(&self) -> Option<TableId> {
        match self {
            EngineEvent::HandStarted { table_id, .. }
            | EngineEvent::HoleCards { table_id, .. }
            | EngineEvent::ActionTaken { table_id, .. }
            | EngineEvent::StreetDealt { table_id, .. }
            | EngineEvent::HandComplete { table_id, .. } => Some(*table_id),
            _ => None,
        }
    }
}

/// Приёмник событий. Доставка best-effort: ошибки не влияют на раздачу.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: EngineEvent);
}

/// Выбрасывает все события.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: EngineEvent) {}
}

/// Копит события в памяти (тесты, симулятор).
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EngineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
