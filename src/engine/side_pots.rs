use serde::{Deserialize, Serialize};

use crate::domain::player::PlayerInHand;
use crate::domain::{Chips, PlayerId};

/// Сайд-пот: часть банка, в которую участвуют только некоторые игроки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    /// Кто может выиграть этот банк (не сфолдил и дотянул до уровня).
    pub eligible: Vec<PlayerId>,
}

/// Разбить банк на уровни по total_bet несфолдивших игроков.
///
/// Уровни идут от младшего к старшему: `[0]`: основной банк.
/// В уровень попадают фишки всех игроков (и сфолдивших тоже) между
/// предыдущим и текущим значением. Фишки сфолдивших выше верхнего
/// уровня докладываются в верхний, так что сумма уровней всегда равна банку.
pub fn compute_side_pots(players: &[PlayerInHand]) -> Vec<SidePot> {
    let mut levels: Vec<Chips> = players
        .iter()
        .filter(|p| p.is_live() && !p.total_bet.is_zero())
        .map(|p| p.total_bet)
        .collect();
    levels.sort();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::with_capacity(levels.len());
    let mut prev = Chips::ZERO;

    for &level in &levels {
        let amount: Chips = players
            .iter()
            .map(|p| p.total_bet.min(level) - p.total_bet.min(prev))
            .sum();

        let eligible: Vec<PlayerId> = players
            .iter()
            .filter(|p| p.is_live() && p.total_bet >= level)
            .map(|p| p.player_id)
            .collect();

        pots.push(SidePot { amount, eligible });
        prev = level;
    }

    let excess: Chips = players.iter().map(|p| p.total_bet.saturating_sub(prev)).sum();
    if let Some(top) = pots.last_mut() {
        top.amount += excess;
    }

    pots
}
