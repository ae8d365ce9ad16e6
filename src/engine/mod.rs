//! Покерный движок: ставки, переход улиц, сайд-поты, шоудаун.
//!
//! Основные операции над `HandRound`:
//!   - `start_hand` – запустить новую раздачу
//!   - `process_action` – применить действие игрока
//!   - `valid_actions` – что сейчас можно сделать
//!   - `force_fold` – сбросить карты игрока вне очереди (уход из-за стола)
//!
//! `TableManager` держит столы и раздачи под замками и гоняет ботов.

pub mod actions;
pub mod errors;
pub mod events;
pub mod game_loop;
pub mod positions;
pub mod side_pots;
pub mod table_manager;
pub mod validation;

pub use actions::{ActionKind, PlayerAction};
pub use errors::{ErrorKind, PokerError};
pub use events::{EngineEvent, EventSink, MemorySink, NullSink};
pub use game_loop::{force_fold, process_action, start_hand, timeout_action, turn_expired, ActionOutcome, StartedHand};
pub use side_pots::{compute_side_pots, SidePot};
pub use table_manager::{ActionReport, HandCompletion, TableManager};
pub use validation::{valid_actions, ValidActions};

/// Источник случайности для движка (тасовка, решения ботов).
///
/// Реализации в `infra::rng`: системный CSPRNG и детерминированный
/// генератор с сидом для воспроизводимых раздач.
pub trait RandomSource {
    /// Равномерное число из `[0, bound)`. `bound > 0`.
    fn next_below(&mut self, bound: usize) -> usize;

    /// Равномерное число из `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Fisher–Yates: для i от конца к началу меняем с j ∈ [0, i].
pub fn shuffle_slice<T, R: RandomSource + ?Sized>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.next_below(i + 1);
        slice.swap(i, j);
    }
}
