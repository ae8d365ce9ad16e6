//! Движок Texas Hold'em No-Limit: колода, оценка рук, ставки с сайд-потами,
//! столы, турниры sit-n-go, боты.
//!
//! Здесь же описываем ABI для Linera (Operation / Query / Response):
//! одна операция = одна команда из `api::Command`.

pub mod api;
pub mod bot;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod state;
pub mod tournament;

pub use api::PokerService;
pub use config::EngineConfig;
pub use engine::{PokerError, TableManager};
pub use tournament::TournamentManager;

use linera_sdk::linera_base_types::{ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Command, CommandResponse, Query, QueryResponse};
use crate::state::PokerState;

/// Операции (внешние команды), которые модуль принимает.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PokerOperation {
    Command(Command),
}

/// Сообщения между приложениями Linera. Пока не нужны.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PokerMessage {}

pub type PokerQuery = Query;

pub type PokerResponse = Result<QueryResponse, ApiError>;

/// ABI для контракта и сервиса.
#[derive(Clone, Debug)]
pub struct PokerAbi;

impl ContractAbi for PokerAbi {
    type Operation = PokerOperation;
    type Response = Result<CommandResponse, ApiError>;
}

impl ServiceAbi for PokerAbi {
    type Query = PokerQuery;
    type QueryResponse = PokerResponse;
}

pub type Storage = PokerState;
