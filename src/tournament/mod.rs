//! Турниры sit-n-go: регистрация, рассадка, уровни блайндов,
//! вылеты, балансировка столов, призы.

pub mod manager;
pub mod rebalance;

pub use manager::{TournamentManager, TournamentProgress};
pub use rebalance::{compute_rebalance_plan, is_balanced, RebalanceMove, RebalancePlan};
