//! Простой бот: вероятностные эвристики поверх оценки силы руки.
//!
//! Бот ходит через тот же `process_action`, что и человек.

pub mod policy;

pub use policy::{decide, hand_strength, BotProfile};
