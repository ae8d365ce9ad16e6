use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::table::SeatIndex;
use crate::domain::PlayerId;

/// Состояние игрока внутри одной раздачи.
///
/// Инвариант: `stack + total_bet == stack_start + winnings`.
/// До выплаты банка `winnings == 0`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerInHand {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub hole_cards: [Card; 2],
    /// Стек на момент старта раздачи.
    pub stack_start: Chips,
    /// Текущий стек (за вычетом всего, что поставлено).
    pub stack: Chips,
    /// Сколько всего внёс в банк за раздачу (анте + блайнды + ставки).
    pub total_bet: Chips,
    /// Сколько внёс на текущей улице.
    pub round_bet: Chips,
    /// Сколько получил из банка(ов) по итогам раздачи.
    pub winnings: Chips,
    pub folded: bool,
    pub all_in: bool,
    /// Делал ли ход на текущей улице (после последнего полного рейза).
    pub has_acted: bool,
    pub is_bot: bool,
}

impl PlayerInHand {
    pub fn new(player_id: PlayerId, seat: SeatIndex, stack: Chips, hole_cards: [Card; 2], is_bot: bool) -> Self {
        Self {
            player_id,
            seat,
            hole_cards,
            stack_start: stack,
            stack,
            total_bet: Chips::ZERO,
            round_bet: Chips::ZERO,
            winnings: Chips::ZERO,
            folded: false,
            all_in: false,
            has_acted: false,
            is_bot,
        }
    }

    /// Ещё претендует на банк (не сфолдил).
    pub fn is_live(&self) -> bool {
        !self.folded
    }

    /// Может ещё делать ставки на этой улице.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    /// Сколько нужно доплатить до `current_bet`.
    pub fn owed(&self, current_bet: Chips) -> Chips {
        current_bet.saturating_sub(self.round_bet)
    }

    /// Переложить до `amount` фишек из стека в банк.
    /// Возвращает реально внесённую сумму (не больше стека).
    /// Стек обнулился → all-in.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let real = amount.min(self.stack);
        self.stack -= real;
        self.total_bet += real;
        self.round_bet += real;
        if self.stack.is_zero() {
            self.all_in = true;
        }
        real
    }

    /// Как `commit`, но без учёта в ставке улицы (анте).
    pub fn commit_dead(&mut self, amount: Chips) -> Chips {
        let real = self.commit(amount);
        self.round_bet -= real;
        real
    }

    /// Проверка инварианта учёта фишек.
    pub fn chips_balanced(&self) -> bool {
        self.stack + self.total_bet == self.stack_start + self.winnings
    }
}
