//! Инфраструктурный слой вокруг покерного движка:
//! - генерация ID;
//! - RNG-реализации для движка;
//! - внешний леджер (бай-ины, выплаты);
//! - абстракция хранения (off-chain / тесты).

pub mod ids;
pub mod ledger;
pub mod persistence;
pub mod rng;
pub mod rng_seed;

pub use ids::IdGenerator;
pub use ledger::{InMemoryLedger, Ledger, LedgerEntry, LedgerError, LedgerOp, LedgerReason};
pub use persistence::{InMemoryPokerStorage, PokerStorage, StorageError};
pub use rng::*;
pub use rng_seed::RngSeed;
