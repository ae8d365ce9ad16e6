use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank};

/// Категория покерной руки по силе: 1 (старшая карта) … 10 (роял-флеш).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 1,
    OnePair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High card",
            HandCategory::OnePair => "One pair",
            HandCategory::TwoPair => "Two pair",
            HandCategory::ThreeOfAKind => "Three of a kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full house",
            HandCategory::FourOfAKind => "Four of a kind",
            HandCategory::StraightFlush => "Straight flush",
            HandCategory::RoyalFlush => "Royal flush",
        }
    }
}

/// Результат оценки руки.
///
/// `tiebreak`: значения рангов (2..=14) в порядке значимости,
/// длина зависит от категории: у каре `[ранг каре, кикер]`, у стрита `[старшая]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
    /// Лучшие 5 карт, упорядоченные по значимости.
    pub best_five: Vec<Card>,
}

impl HandValue {
    /// Сравнение по силе: сначала категория, потом tiebreak поэлементно.
    /// Недостающие элементы считаются нулями.
    pub fn strength_cmp(&self, other: &HandValue) -> Ordering {
        self.category.cmp(&other.category).then_with(|| {
            let len = self.tiebreak.len().max(other.tiebreak.len());
            (0..len)
                .map(|i| {
                    let a = self.tiebreak.get(i).copied().unwrap_or(0);
                    let b = other.tiebreak.get(i).copied().unwrap_or(0);
                    a.cmp(&b)
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Человеческое описание: "Full house, Kings full of Sevens".
    pub fn describe(&self) -> String {
        let r = |i: usize| {
            self.tiebreak
                .get(i)
                .copied()
                .and_then(Rank::from_value)
                .map(rank_name)
                .unwrap_or("?")
        };
        let cat = self.category.name();
        match self.category {
            HandCategory::RoyalFlush => cat.to_string(),
            HandCategory::StraightFlush | HandCategory::Straight => {
                format!("{cat}, {} high", r(0))
            }
            HandCategory::FourOfAKind | HandCategory::ThreeOfAKind | HandCategory::OnePair => {
                format!("{cat}, {}s", r(0))
            }
            HandCategory::FullHouse => format!("{cat}, {}s full of {}s", r(0), r(1)),
            HandCategory::TwoPair => format!("{cat}, {}s and {}s", r(0), r(1)),
            HandCategory::Flush | HandCategory::HighCard => format!("{cat}, {} high", r(0)),
        }
    }
}

fn rank_name(rank: Rank) -> &'static str {
    match rank {
        Rank::Two => "Two",
        Rank::Three => "Three",
        Rank::Four => "Four",
        Rank::Five => "Five",
        Rank::Six => "Six",
        Rank::Seven => "Seven",
        Rank::Eight => "Eight",
        Rank::Nine => "Nine",
        Rank::Ten => "Ten",
        Rank::Jack => "Jack",
        Rank::Queen => "Queen",
        Rank::King => "King",
        Rank::Ace => "Ace",
    }
}
