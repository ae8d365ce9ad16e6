use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindLevel;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::player::PlayerInHand;
use crate::domain::table::SeatIndex;
use crate::domain::{HandId, PlayerId, TableId};
use crate::engine::actions::ActionKind;
use crate::engine::side_pots::SidePot;
use crate::eval::HandValue;

/// Статус раздачи (машина состояний).
///
/// `Preflop → Flop → Turn → River → Showdown → Complete`,
/// плюс ранние выходы в `Complete` (все сфолдили) и прогон борда при общем all-in.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandStatus {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

impl HandStatus {
    pub fn is_betting_street(self) -> bool {
        matches!(
            self,
            HandStatus::Preflop | HandStatus::Flop | HandStatus::Turn | HandStatus::River
        )
    }
}

/// Что делать с остатком от деления банка между победителями.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OddChipPolicy {
    /// Остаток никому не выплачивается и остаётся в `HandRound::undistributed`.
    #[default]
    Discard,
    /// Остаток целиком получает первый победитель слева от дилера.
    FirstLeftOfDealer,
}

/// Запись в журнале действий (только добавление).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub street: HandStatus,
    pub kind: ActionKind,
    /// Сколько фишек реально переложено в банк этим действием.
    pub amount: Chips,
    /// Ставка игрока на улице после действия.
    pub round_bet_after: Chips,
    pub at: u64,
}

/// Выплата из одного банка одному победителю.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotAward {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    /// Номер банка: 0 = основной, дальше сайд-поты.
    pub pot_index: usize,
    pub amount: Chips,
    /// Рука победителя (None, если все остальные сфолдили).
    pub hand: Option<HandValue>,
}

/// Одна покерная раздача за конкретным столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandRound {
    pub id: HandId,
    pub table_id: TableId,
    /// Порядковый номер раздачи за столом.
    pub hand_number: u64,
    pub status: HandStatus,
    pub deck: Deck,
    pub community: Vec<Card>,
    /// Сумма всех total_bet минус уже выплаченное.
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    /// Ставка, которую нужно уравнять на текущей улице.
    pub current_bet: Chips,
    /// Минимальный размер повышения.
    pub min_raise: Chips,
    /// Чей ход (место). None: ход ничей (раздача закончена или идёт прогон).
    pub acting_seat: Option<SeatIndex>,
    pub dealer_seat: SeatIndex,
    pub small_blind_seat: SeatIndex,
    pub big_blind_seat: SeatIndex,
    pub blinds: BlindLevel,
    pub odd_chip_policy: OddChipPolicy,
    /// Игроки в порядке мест.
    pub players: Vec<PlayerInHand>,
    pub actions: Vec<ActionRecord>,
    pub awards: Vec<PotAward>,
    /// Остаток от деления банка, который никому не выплачен.
    pub undistributed: Chips,
    pub started_at: u64,
    pub last_action_at: u64,
    pub completed_at: Option<u64>,
}

impl HandRound {
    pub fn is_complete(&self) -> bool {
        self.status == HandStatus::Complete
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerInHand> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerInHand> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn player_at(&self, seat: SeatIndex) -> Option<&PlayerInHand> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn index_of_seat(&self, seat: SeatIndex) -> Option<usize> {
        self.players.iter().position(|p| p.seat == seat)
    }

    /// Игрок, чей сейчас ход.
    pub fn acting_player(&self) -> Option<&PlayerInHand> {
        self.acting_seat.and_then(|s| self.player_at(s))
    }

    pub fn live_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_live()).count()
    }

    pub fn total_committed(&self) -> Chips {
        self.players.iter().map(|p| p.total_bet).sum()
    }

    pub fn total_awarded(&self) -> Chips {
        self.awards.iter().map(|a| a.amount).sum()
    }

    /// Фишки сохраняются: стеки + невыплаченный банк == стартовые стеки.
    pub fn chips_conserved(&self) -> bool {
        let start: Chips = self.players.iter().map(|p| p.stack_start).sum();
        let now: Chips = self.players.iter().map(|p| p.stack).sum();
        now + self.pot == start && self.players.iter().all(|p| p.chips_balanced())
    }
}
