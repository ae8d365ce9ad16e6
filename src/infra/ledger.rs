//! Внешний денежный леджер: бай-ины, кэш-ауты, призовые.
//!
//! Движок только вызывает `debit`/`credit` до изменения своего состояния.
//! Каждая операция несёт ключ идемпотентности: повтор с тем же ключом
//! ничего не меняет.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Chips, PlayerId, TableId, TournamentId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("У игрока {player_id} недостаточно средств: нужно {needed}, есть {available}")]
    InsufficientFunds {
        player_id: PlayerId,
        needed: Chips,
        available: Chips,
    },

    #[error("Леджер недоступен: {0}")]
    Unavailable(String),
}

/// Зачем двигаем деньги.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LedgerReason {
    CashBuyIn { table_id: TableId },
    CashRebuy { table_id: TableId },
    CashOut { table_id: TableId },
    TournamentBuyIn { tournament_id: TournamentId },
    TournamentRefund { tournament_id: TournamentId },
    TournamentPrize { tournament_id: TournamentId, place: u32 },
}

/// Одна операция леджера.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerOp {
    /// Ключ идемпотентности.
    pub key: String,
    pub player_id: PlayerId,
    pub amount: Chips,
    pub reason: LedgerReason,
}

impl LedgerOp {
    pub fn new(key: impl Into<String>, player_id: PlayerId, amount: Chips, reason: LedgerReason) -> Self {
        Self {
            key: key.into(),
            player_id,
            amount,
            reason,
        }
    }
}

pub trait Ledger: Send + Sync {
    /// Списать средства игрока.
    fn debit(&self, op: &LedgerOp) -> Result<(), LedgerError>;

    /// Зачислить средства игроку.
    fn credit(&self, op: &LedgerOp) -> Result<(), LedgerError>;
}

/// Запись журнала in-memory леджера.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEntry {
    Debit(LedgerOp),
    Credit(LedgerOp),
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<PlayerId, Chips>,
    applied: HashSet<String>,
    journal: Vec<LedgerEntry>,
}

/// In-memory леджер для тестов и симулятора.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Пополнить баланс вне журнала (стартовые деньги).
    pub fn deposit(&self, player_id: PlayerId, amount: Chips) {
        if let Ok(mut inner) = self.inner.lock() {
            *inner.balances.entry(player_id).or_default() += amount;
        }
    }

    pub fn balance(&self, player_id: PlayerId) -> Chips {
        self.inner
            .lock()
            .map(|i| i.balances.get(&player_id).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn journal(&self) -> Vec<LedgerEntry> {
        self.inner.lock().map(|i| i.journal.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerInner>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Unavailable("mutex poisoned".into()))
    }
}

impl Ledger for InMemoryLedger {
    fn debit(&self, op: &LedgerOp) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        if inner.applied.contains(&op.key) {
            return Ok(());
        }

        let available = inner.balances.get(&op.player_id).copied().unwrap_or_default();
        if available < op.amount {
            return Err(LedgerError::InsufficientFunds {
                player_id: op.player_id,
                needed: op.amount,
                available,
            });
        }

        inner.balances.insert(op.player_id, available - op.amount);
        inner.applied.insert(op.key.clone());
        inner.journal.push(LedgerEntry::Debit(op.clone()));
        Ok(())
    }

    fn credit(&self, op: &LedgerOp) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        if inner.applied.contains(&op.key) {
            return Ok(());
        }

        *inner.balances.entry(op.player_id).or_default() += op.amount;
        inner.applied.insert(op.key.clone());
        inner.journal.push(LedgerEntry::Credit(op.clone()));
        Ok(())
    }
}
