use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::domain::hand::HandRound;
use crate::domain::table::Table;
use crate::domain::tournament::Tournament;
use crate::domain::{HandId, TableId, TournamentId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Хранилище недоступно: {0}")]
    Unavailable(String),

    #[error("Ошибка сериализации: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Абстракция хранилища для покера.
///
/// В Linera-режиме записи живут в `PokerState` (views), эта абстракция
/// нужна менеджерам столов и турниров вне контракта и тестам.
/// Запись делается после каждой мутации.
pub trait PokerStorage: Send + Sync {
    fn save_table(&self, table: &Table) -> Result<(), StorageError>;
    fn load_table(&self, id: TableId) -> Result<Option<Table>, StorageError>;
    fn delete_table(&self, id: TableId) -> Result<(), StorageError>;

    fn save_hand(&self, hand: &HandRound) -> Result<(), StorageError>;
    fn load_hand(&self, id: HandId) -> Result<Option<HandRound>, StorageError>;

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StorageError>;
    fn load_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StorageError>;
}

#[derive(Debug, Default)]
struct Records {
    tables: HashMap<TableId, Table>,
    hands: HashMap<HandId, HandRound>,
    tournaments: HashMap<TournamentId, Tournament>,
}

/// Простая in-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryPokerStorage {
    records: Mutex<Records>,
}

#[derive(Serialize)]
struct Dump<'a> {
    tables: Vec<&'a Table>,
    tournaments: Vec<&'a Tournament>,
    hands_stored: usize,
}

impl InMemoryPokerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Records>, StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Unavailable("mutex poisoned".into()))
    }

    pub fn hand_count(&self) -> usize {
        self.records().map(|r| r.hands.len()).unwrap_or(0)
    }

    /// Снимок столов и турниров в JSON (отладка, симулятор).
    pub fn export_json(&self) -> Result<String, StorageError> {
        let r = self.records()?;
        let mut tables: Vec<&Table> = r.tables.values().collect();
        tables.sort_by_key(|t| t.id);
        let mut tournaments: Vec<&Tournament> = r.tournaments.values().collect();
        tournaments.sort_by_key(|t| t.id);

        let dump = Dump {
            tables,
            tournaments,
            hands_stored: r.hands.len(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

impl PokerStorage for InMemoryPokerStorage {
    fn save_table(&self, table: &Table) -> Result<(), StorageError> {
        self.records()?.tables.insert(table.id, table.clone());
        Ok(())
    }

    fn load_table(&self, id: TableId) -> Result<Option<Table>, StorageError> {
        Ok(self.records()?.tables.get(&id).cloned())
    }

    fn delete_table(&self, id: TableId) -> Result<(), StorageError> {
        self.records()?.tables.remove(&id);
        Ok(())
    }

    fn save_hand(&self, hand: &HandRound) -> Result<(), StorageError> {
        self.records()?.hands.insert(hand.id, hand.clone());
        Ok(())
    }

    fn load_hand(&self, id: HandId) -> Result<Option<HandRound>, StorageError> {
        Ok(self.records()?.hands.get(&id).cloned())
    }

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StorageError> {
        self.records()?
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn load_tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StorageError> {
        Ok(self.records()?.tournaments.get(&id).cloned())
    }
}
