use serde::{Deserialize, Serialize};

use crate::domain::hand::HandRound;
use crate::domain::player::PlayerInHand;
use crate::domain::{Chips, PlayerId};
use crate::engine::actions::ActionKind;
use crate::engine::errors::PokerError;

/// Допустимые действия игрока плюс границы сумм.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidActions {
    pub player_id: PlayerId,
    pub actions: Vec<ActionKind>,
    /// Сколько нужно доплатить до текущей ставки.
    pub call_amount: Chips,
    /// Минимальный bet (если bet допустим).
    pub min_bet: Chips,
    /// Минимальная итоговая ставка при raise.
    pub min_raise_to: Chips,
    /// Максимум, до которого игрок может довести ставку улицы (round_bet + stack).
    pub max_commit: Chips,
}

impl ValidActions {
    pub fn contains(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn none(player_id: PlayerId) -> Self {
        Self {
            player_id,
            actions: Vec::new(),
            call_amount: Chips::ZERO,
            min_bet: Chips::ZERO,
            min_raise_to: Chips::ZERO,
            max_commit: Chips::ZERO,
        }
    }
}

/// Что игрок может сделать при текущем состоянии ставок.
///
/// Очерёдность хода здесь не проверяется: сфолдивший/all-in игрок
/// или раздача вне улицы ставок дают пустой набор.
pub fn valid_actions(hand: &HandRound, player_id: PlayerId) -> Result<ValidActions, PokerError> {
    let player = hand
        .player(player_id)
        .ok_or(PokerError::PlayerNotInHand(player_id))?;

    if !hand.status.is_betting_street() || !player.can_act() {
        return Ok(ValidActions::none(player_id));
    }

    Ok(actions_for(player, hand.current_bet, hand.min_raise))
}

pub(crate) fn actions_for(player: &PlayerInHand, current_bet: Chips, min_raise: Chips) -> ValidActions {
    let owed = player.owed(current_bet);
    let stack = player.stack;
    // Уже ходил и снова должен: после его хода был только неполный all-in.
    // Торговля для него закрыта: call или fold, all-in не больше доплаты.
    let reopened = !(player.has_acted && !owed.is_zero());
    let mut actions = Vec::with_capacity(4);

    if !owed.is_zero() {
        actions.push(ActionKind::Fold);
    }
    if owed.is_zero() {
        actions.push(ActionKind::Check);
    }
    if !owed.is_zero() && stack > owed {
        actions.push(ActionKind::Call);
    }
    if current_bet.is_zero() && !stack.is_zero() {
        actions.push(ActionKind::Bet);
    }
    if !current_bet.is_zero() && stack > owed && reopened {
        actions.push(ActionKind::Raise);
    }
    if !stack.is_zero() && (reopened || stack <= owed) {
        actions.push(ActionKind::AllIn);
    }

    ValidActions {
        player_id: player.player_id,
        actions,
        call_amount: owed.min(stack),
        min_bet: min_raise.min(stack),
        min_raise_to: (current_bet + min_raise).min(player.round_bet + stack),
        max_commit: player.round_bet + stack,
    }
}
