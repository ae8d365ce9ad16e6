use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::{Card, Rank, Suit};
use crate::engine::{shuffle_slice, RandomSource};

/// Колоде не хватает карт для очередной сдачи.
///
/// При свежей колоде и ≤ 9 игроках такого быть не может, поэтому это
/// признак ошибки учёта карт, а не пользовательской ошибки.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("В колоде не хватает карт: нужно {needed}, осталось {remaining}")]
pub struct InsufficientCards {
    pub needed: usize,
    pub remaining: usize,
}

/// Колода карт. Упорядоченный список, карты снимаются с головы (index 0).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Стандартная 52-карточная колода в каноническом порядке:
    /// Clubs 2..A, Diamonds 2..A, Hearts 2..A, Spades 2..A.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Fisher–Yates на переданном источнике случайности.
    pub fn shuffle<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        shuffle_slice(&mut self.cards, rng);
    }

    /// Снять n карт с головы колоды.
    pub fn take(&mut self, n: usize) -> Result<Vec<Card>, InsufficientCards> {
        self.ensure(n)?;
        Ok(self.cards.drain(..n).collect())
    }

    /// Сжечь одну карту.
    pub fn burn(&mut self) -> Result<(), InsufficientCards> {
        self.take(1).map(|_| ())
    }

    /// Карманные карты для `players` игроков.
    ///
    /// Как живой дилер: сначала первая карта каждому, потом вторая.
    /// Результат `[i]`: карты i-го игрока в порядке раздачи.
    pub fn deal_hole(&mut self, players: usize) -> Result<Vec<[Card; 2]>, InsufficientCards> {
        self.ensure(players * 2)?;
        let first = self.take(players)?;
        let second = self.take(players)?;
        Ok(first
            .into_iter()
            .zip(second)
            .map(|(a, b)| [a, b])
            .collect())
    }

    pub fn deal_flop(&mut self) -> Result<[Card; 3], InsufficientCards> {
        self.ensure(4)?;
        self.burn()?;
        let cards = self.take(3)?;
        Ok([cards[0], cards[1], cards[2]])
    }

    pub fn deal_turn(&mut self) -> Result<Card, InsufficientCards> {
        self.deal_single()
    }

    pub fn deal_river(&mut self) -> Result<Card, InsufficientCards> {
        self.deal_single()
    }

    fn deal_single(&mut self) -> Result<Card, InsufficientCards> {
        self.ensure(2)?;
        self.burn()?;
        let cards = self.take(1)?;
        Ok(cards[0])
    }

    fn ensure(&self, needed: usize) -> Result<(), InsufficientCards> {
        if self.cards.len() < needed {
            return Err(InsufficientCards {
                needed,
                remaining: self.cards.len(),
            });
        }
        Ok(())
    }
}
