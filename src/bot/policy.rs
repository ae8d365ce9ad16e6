use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::hand::HandRound;
use crate::domain::player::PlayerInHand;
use crate::domain::Chips;
use crate::engine::actions::{ActionKind, PlayerAction};
use crate::engine::validation::ValidActions;
use crate::engine::RandomSource;
use crate::eval::{evaluate_hole, HandCategory};

/// Параметры поведения бота. Все вероятности в [0, 1].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotProfile {
    /// Ставка «большая», если доплата больше этой доли от фишек игрока.
    pub large_bet_fraction: f64,
    /// Шанс сбросить слабую руку против большой ставки.
    pub fold_probability: f64,
    /// Шанс поставить, когда ставки нет.
    pub bet_probability: f64,
    /// Шанс повысить с сильной рукой.
    pub raise_probability: f64,
    /// Шанс пойти all-in с очень сильной рукой.
    pub all_in_probability: f64,
    /// Размер bet/raise относительно банка.
    pub pot_fraction: f64,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            large_bet_fraction: 0.3,
            fold_probability: 0.7,
            bet_probability: 0.25,
            raise_probability: 0.3,
            all_in_probability: 0.1,
            pot_fraction: 0.66,
        }
    }
}

impl BotProfile {
    pub fn validate(&self) -> Result<(), String> {
        let probs = [
            ("fold_probability", self.fold_probability),
            ("bet_probability", self.bet_probability),
            ("raise_probability", self.raise_probability),
            ("all_in_probability", self.all_in_probability),
            ("large_bet_fraction", self.large_bet_fraction),
        ];
        for (name, v) in probs {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("BotProfile: {name} must be in [0, 1], got {v}"));
            }
        }
        if self.pot_fraction <= 0.0 {
            return Err("BotProfile: pot_fraction must be > 0".into());
        }
        Ok(())
    }
}

/// Грубая оценка силы руки в [0, 1].
///
/// До флопа по карманным картам, дальше по категории лучшей руки.
pub fn hand_strength(hole: &[Card; 2], community: &[Card]) -> f64 {
    if community.len() < 3 {
        return preflop_strength(hole);
    }
    match evaluate_hole(hole, community) {
        Ok(v) => category_strength(v.category),
        Err(_) => preflop_strength(hole),
    }
}

fn preflop_strength(hole: &[Card; 2]) -> f64 {
    let hi = hole[0].rank.value().max(hole[1].rank.value()) as f64;
    let lo = hole[0].rank.value().min(hole[1].rank.value()) as f64;

    let mut s = (hi + lo - 4.0) / 48.0 * 0.6;
    if hole[0].rank == hole[1].rank {
        s += 0.3 + lo / 14.0 * 0.1;
    }
    if hole[0].suit == hole[1].suit {
        s += 0.05;
    }
    if hi - lo == 1.0 {
        s += 0.03;
    }
    s.clamp(0.0, 1.0)
}

fn category_strength(category: HandCategory) -> f64 {
    match category {
        HandCategory::HighCard => 0.1,
        HandCategory::OnePair => 0.3,
        HandCategory::TwoPair => 0.45,
        HandCategory::ThreeOfAKind => 0.6,
        HandCategory::Straight => 0.7,
        HandCategory::Flush => 0.75,
        HandCategory::FullHouse => 0.85,
        HandCategory::FourOfAKind => 0.95,
        HandCategory::StraightFlush | HandCategory::RoyalFlush => 1.0,
    }
}

/// Решение бота. Возвращает только действие из `valid`,
/// суммы в пределах, которые движок принял бы без обрезки.
pub fn decide<R: RandomSource + ?Sized>(
    hand: &HandRound,
    player: &PlayerInHand,
    valid: &ValidActions,
    profile: &BotProfile,
    rng: &mut R,
) -> PlayerAction {
    let pid = player.player_id;
    if valid.is_empty() {
        return PlayerAction::fold(pid);
    }

    let strength = hand_strength(&player.hole_cards, &hand.community);
    let roll = rng.next_unit();

    // Очень сильная рука: иногда сразу all-in.
    if strength >= 0.85 && valid.contains(ActionKind::AllIn) && roll < profile.all_in_probability {
        return PlayerAction::all_in(pid);
    }

    let target = sized_target(hand, profile);

    if valid.call_amount.is_zero() {
        if valid.contains(ActionKind::Bet) && roll < profile.bet_probability * (0.5 + strength) {
            let amount = target.max(valid.min_bet).min(player.stack);
            return PlayerAction::bet(pid, amount);
        }
        if valid.contains(ActionKind::Raise) && strength >= 0.5 && roll < profile.raise_probability {
            let to = (hand.current_bet + target)
                .max(valid.min_raise_to)
                .min(valid.max_commit);
            return PlayerAction::raise_to(pid, to);
        }
        return PlayerAction::check(pid);
    }

    // Есть ставка, которую нужно уравнять.
    let chips = player.stack + player.round_bet;
    let large = valid.call_amount.0 as f64 > chips.0 as f64 * profile.large_bet_fraction;
    if large && strength < 0.5 && roll < profile.fold_probability {
        return PlayerAction::fold(pid);
    }

    if valid.contains(ActionKind::Raise) && strength >= 0.6 && roll < profile.raise_probability {
        let to = (hand.current_bet + target)
            .max(valid.min_raise_to)
            .min(valid.max_commit);
        return PlayerAction::raise_to(pid, to);
    }

    if valid.contains(ActionKind::Call) {
        return PlayerAction::call(pid);
    }

    // Доплата съедает весь стек: либо all-in, либо пас.
    if strength >= 0.4 && valid.contains(ActionKind::AllIn) {
        PlayerAction::all_in(pid)
    } else {
        PlayerAction::fold(pid)
    }
}

/// Желаемый размер ставки от банка, не меньше большого блайнда.
fn sized_target(hand: &HandRound, profile: &BotProfile) -> Chips {
    let raw = (hand.pot.0 as f64 * profile.pot_fraction) as u64;
    Chips(raw).max(hand.blinds.big_blind)
}
