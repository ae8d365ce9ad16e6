//! Модуль оценки силы покерных рук (Texas Hold'em).
//!
//! Основная функция:
//!   `evaluate(cards) -> Result<HandValue, EvalError>` для 5–7 карт.

pub mod evaluator;
pub mod hand_rank;
pub mod lookup_tables;

pub use evaluator::{compare, evaluate, evaluate_hole, find_winners, rank_hands, EvalError};
pub use hand_rank::{HandCategory, HandValue};
