use core::cmp::Ordering;

use thiserror::Error;

use crate::domain::card::Card;
use crate::domain::PlayerId;

use super::hand_rank::{HandCategory, HandValue};
use super::lookup_tables::{detect_straight, rank_to_bit, RankMask};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("Для оценки нужно от 5 до 7 карт, получено {0}")]
    WrongCardCount(usize),

    #[error("Карта {0} встречается дважды")]
    DuplicateCard(Card),
}

/// Лучшая 5-карточная рука из 5–7 уникальных карт.
pub fn evaluate(cards: &[Card]) -> Result<HandValue, EvalError> {
    let n = cards.len();
    if !(5..=7).contains(&n) {
        return Err(EvalError::WrongCardCount(n));
    }
    for (i, c) in cards.iter().enumerate() {
        if cards[i + 1..].contains(c) {
            return Err(EvalError::DuplicateCard(*c));
        }
    }

    // Перебираем все C(n, 5) комбинаций (не больше 21).
    let mut best: Option<HandValue> = None;
    for a in 0..(n - 4) {
        for b in (a + 1)..(n - 3) {
            for c in (b + 1)..(n - 2) {
                for d in (c + 1)..(n - 1) {
                    for e in (d + 1)..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let v = evaluate_five(&five);
                        let better = match &best {
                            Some(cur) => v.strength_cmp(cur) == Ordering::Greater,
                            None => true,
                        };
                        if better {
                            best = Some(v);
                        }
                    }
                }
            }
        }
    }

    best.ok_or(EvalError::WrongCardCount(n))
}

/// Лучшая рука игрока: карманные карты + борд.
pub fn evaluate_hole(hole: &[Card; 2], community: &[Card]) -> Result<HandValue, EvalError> {
    let mut all = Vec::with_capacity(2 + community.len());
    all.extend_from_slice(hole);
    all.extend_from_slice(community);
    evaluate(&all)
}

/// Полное упорядочение рук по силе.
pub fn compare(a: &HandValue, b: &HandValue) -> Ordering {
    a.strength_cmp(b)
}

/// Все игроки с оценками, от сильнейшего к слабейшему.
/// При равенстве сохраняется входной порядок.
pub fn rank_hands(
    players: &[(PlayerId, [Card; 2])],
    community: &[Card],
) -> Result<Vec<(PlayerId, HandValue)>, EvalError> {
    let mut ranked = players
        .iter()
        .map(|(id, hole)| evaluate_hole(hole, community).map(|v| (*id, v)))
        .collect::<Result<Vec<_>, _>>()?;
    ranked.sort_by(|a, b| compare(&b.1, &a.1));
    Ok(ranked)
}

/// Победители: все игроки, чья рука равна лучшей.
pub fn find_winners(
    players: &[(PlayerId, [Card; 2])],
    community: &[Card],
) -> Result<Vec<PlayerId>, EvalError> {
    let ranked = rank_hands(players, community)?;
    let Some((_, top)) = ranked.first() else {
        return Ok(Vec::new());
    };
    Ok(ranked
        .iter()
        .take_while(|(_, v)| compare(v, top) == Ordering::Equal)
        .map(|(id, _)| *id)
        .collect())
}

/// Оценка ровно 5 карт.
fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let mut rank_counts = [0u8; 15];
    let mut rank_mask: RankMask = 0;
    let first_suit = cards[0].suit;
    let is_flush = cards.iter().all(|c| c.suit == first_suit);

    for card in cards {
        rank_counts[card.rank.value() as usize] += 1;
        rank_mask |= rank_to_bit(card.rank);
    }

    // Группы (count, rank): сначала по размеру, потом по рангу.
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    let pattern: Vec<u8> = groups.iter().map(|g| g.0).collect();
    let group_ranks: Vec<u8> = groups.iter().map(|g| g.1).collect();

    if let Some(high) = detect_straight(rank_mask) {
        let best_five = order_straight(cards, high);
        let category = match (is_flush, high) {
            (true, 14) => HandCategory::RoyalFlush,
            (true, _) => HandCategory::StraightFlush,
            (false, _) => HandCategory::Straight,
        };
        return HandValue {
            category,
            tiebreak: vec![high],
            best_five,
        };
    }

    let category = match pattern.as_slice() {
        [4, 1] => HandCategory::FourOfAKind,
        [3, 2] => HandCategory::FullHouse,
        _ if is_flush => HandCategory::Flush,
        [3, 1, 1] => HandCategory::ThreeOfAKind,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };

    HandValue {
        category,
        tiebreak: group_ranks.clone(),
        best_five: order_by_groups(cards, &group_ranks),
    }
}

fn order_by_groups(cards: &[Card; 5], group_ranks: &[u8]) -> Vec<Card> {
    group_ranks
        .iter()
        .flat_map(|&r| cards.iter().filter(move |c| c.rank.value() == r).copied())
        .collect()
}

/// Карты стрита от старшей к младшей; в колесе туз идёт последним.
fn order_straight(cards: &[Card; 5], high: u8) -> Vec<Card> {
    let mut out = cards.to_vec();
    let key = |c: &Card| {
        let v = c.rank.value();
        if high == 5 && v == 14 {
            1
        } else {
            v
        }
    };
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}
