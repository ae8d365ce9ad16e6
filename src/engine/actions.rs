use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Chips, PlayerId};

/// Тип действия игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    /// Bet на улице без текущей ставки.
    Bet,
    /// Raise существующей ставки.
    Raise,
    /// All-in – поставить весь стек.
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "all-in",
        };
        f.write_str(s)
    }
}

/// Конкретное действие игрока.
///
/// `amount` учитывается только для `Bet` (размер ставки) и
/// `Raise` (итоговая ставка на улице, «raise to»). Движок сам
/// подтягивает сумму до минимума и обрезает по стеку.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAction {
    pub player_id: PlayerId,
    pub kind: ActionKind,
    pub amount: Chips,
}

impl PlayerAction {
    pub fn new(player_id: PlayerId, kind: ActionKind, amount: Chips) -> Self {
        Self {
            player_id,
            kind,
            amount,
        }
    }

    pub fn fold(player_id: PlayerId) -> Self {
        Self::new(player_id, ActionKind::Fold, Chips::ZERO)
    }

    pub fn check(player_id: PlayerId) -> Self {
        Self::new(player_id, ActionKind::Check, Chips::ZERO)
    }

    pub fn call(player_id: PlayerId) -> Self {
        Self::new(player_id, ActionKind::Call, Chips::ZERO)
    }

    pub fn bet(player_id: PlayerId, amount: Chips) -> Self {
        Self::new(player_id, ActionKind::Bet, amount)
    }

    pub fn raise_to(player_id: PlayerId, target: Chips) -> Self {
        Self::new(player_id, ActionKind::Raise, target)
    }

    pub fn all_in(player_id: PlayerId) -> Self {
        Self::new(player_id, ActionKind::AllIn, Chips::ZERO)
    }
}
