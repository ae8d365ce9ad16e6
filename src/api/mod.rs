//! Внешний API покерного движка.
//!
//! - команды (commands.rs): всё, что меняет состояние;
//! - запросы (queries.rs): только чтение;
//! - DTO (dto.rs): структуры для фронта, включая `sanitize_for_player`;
//! - ошибки (errors.rs): то, что видит клиент.
//!
//! `PokerService` исполняет команды поверх `TableManager` и `TournamentManager`.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

use std::sync::Arc;

use log::debug;

use crate::engine::table_manager::TableManager;
use crate::tournament::TournamentManager;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;

/// Точка входа для внешнего кода: одна команда, один вызов.
pub struct PokerService {
    tables: Arc<TableManager>,
    tournaments: Arc<TournamentManager>,
}

impl PokerService {
    pub fn new(tournaments: Arc<TournamentManager>) -> Self {
        Self {
            tables: Arc::clone(tournaments.tables()),
            tournaments,
        }
    }

    pub fn tables(&self) -> &Arc<TableManager> {
        &self.tables
    }

    pub fn tournaments(&self) -> &Arc<TournamentManager> {
        &self.tournaments
    }

    /// Выполнить команду. `now`: текущее время в секундах.
    pub fn execute(&self, command: Command, now: u64) -> Result<CommandResponse, ApiError> {
        debug!("{:<32}{}", "command", format!("{command:?}"));
        match command {
            Command::Table(cmd) => self.execute_table(cmd, now),
            Command::Tournament(cmd) => self.execute_tournament(cmd, now),
        }
    }

    fn execute_table(&self, cmd: TableCommand, now: u64) -> Result<CommandResponse, ApiError> {
        let tm = &self.tables;
        let resp = match cmd {
            TableCommand::Create { name, config } => {
                let id = tm.create_table(name, config)?;
                CommandResponse::TableCreated(TableView::from(&tm.table(id)?))
            }
            TableCommand::Join {
                table_id,
                player_id,
                buy_in,
                is_bot,
            } => {
                let seat = tm.join(table_id, player_id, buy_in, is_bot)?;
                CommandResponse::Seated { table_id, seat }
            }
            TableCommand::Leave { table_id, player_id } => {
                self.ensure_cash_table(table_id)?;
                let amount = tm.leave(table_id, player_id, now)?;
                CommandResponse::CashedOut { player_id, amount }
            }
            TableCommand::Rebuy {
                table_id,
                player_id,
                amount,
            } => {
                tm.rebuy(table_id, player_id, amount)?;
                CommandResponse::Ok
            }
            TableCommand::SitOut {
                table_id,
                player_id,
                sitting_out,
            } => {
                tm.sit_out(table_id, player_id, sitting_out)?;
                CommandResponse::Ok
            }
            TableCommand::SetStakes { table_id, stakes } => {
                self.ensure_cash_table(table_id)?;
                tm.set_stakes(table_id, stakes)?;
                CommandResponse::Ok
            }
            TableCommand::Close { table_id } => {
                self.ensure_cash_table(table_id)?;
                CommandResponse::TableClosed {
                    released: tm.close_table(table_id)?,
                }
            }
            TableCommand::StartHand { table_id } => {
                self.ensure_cash_table(table_id)?;
                CommandResponse::Hand(tm.start_hand(table_id, now)?)
            }
            TableCommand::Act { table_id, action } => match tm.table(table_id)?.tournament_id {
                Some(tournament_id) => {
                    let (report, progress) = self.tournaments.process_action(tournament_id, table_id, action, now)?;
                    CommandResponse::TournamentProgress {
                        report: Some(report),
                        progress,
                    }
                }
                None => CommandResponse::Hand(tm.process_action(table_id, action, now)?),
            },
            TableCommand::EnforceTimeout { table_id } => match tm.table(table_id)?.tournament_id {
                Some(tournament_id) => CommandResponse::TournamentProgress {
                    report: None,
                    progress: self.tournaments.tick(tournament_id, now)?,
                },
                None => match tm.enforce_turn_timeout(table_id, now)? {
                    Some(report) => CommandResponse::Hand(report),
                    None => CommandResponse::NoTimeout,
                },
            },
        };
        Ok(resp)
    }

    fn execute_tournament(&self, cmd: TournamentCommand, now: u64) -> Result<CommandResponse, ApiError> {
        let tr = &self.tournaments;
        let resp = match cmd {
            TournamentCommand::Create { config } => CommandResponse::TournamentCreated {
                tournament_id: tr.create_tournament(config)?,
            },
            TournamentCommand::Register {
                tournament_id,
                player_id,
                is_bot,
            } => {
                tr.register(tournament_id, player_id, is_bot)?;
                CommandResponse::Ok
            }
            TournamentCommand::Unregister {
                tournament_id,
                player_id,
            } => {
                tr.unregister(tournament_id, player_id)?;
                CommandResponse::Ok
            }
            TournamentCommand::Cancel { tournament_id } => {
                tr.cancel(tournament_id, now)?;
                CommandResponse::Ok
            }
            TournamentCommand::Start { tournament_id } => CommandResponse::TournamentProgress {
                report: None,
                progress: tr.start(tournament_id, now)?,
            },
            TournamentCommand::Tick { tournament_id } => CommandResponse::TournamentProgress {
                report: None,
                progress: tr.tick(tournament_id, now)?,
            },
            TournamentCommand::EliminatePlayer {
                tournament_id,
                player_id,
            } => CommandResponse::Eliminated {
                player_id,
                place: tr.eliminate_player(tournament_id, player_id, now)?,
            },
            TournamentCommand::CheckComplete { tournament_id } => CommandResponse::TournamentComplete {
                completed: tr.check_complete(tournament_id, now)?,
            },
            TournamentCommand::AdvanceBlindLevel { tournament_id } => CommandResponse::BlindLevel {
                level: tr.advance_blind_level(tournament_id, now)?,
            },
            TournamentCommand::DistributePrizes { tournament_id } => {
                CommandResponse::Standings(tr.distribute_prizes(tournament_id, now)?)
            }
            TournamentCommand::BalanceTables { tournament_id } => {
                CommandResponse::PlayersMoved(tr.balance_tables(tournament_id)?)
            }
        };
        Ok(resp)
    }

    /// Запрос только на чтение.
    pub fn query(&self, query: Query) -> Result<QueryResponse, ApiError> {
        let tm = &self.tables;
        let resp = match query {
            Query::ListTables => {
                let mut views = Vec::new();
                for id in tm.table_ids() {
                    views.push(TableView::from(&tm.table(id)?));
                }
                QueryResponse::Tables(views)
            }
            Query::GetTable { table_id } => QueryResponse::Table(TableView::from(&tm.table(table_id)?)),
            Query::GetHand { table_id, viewer } => QueryResponse::Hand(
                tm.latest_hand(table_id)?
                    .map(|hand| sanitize_for_player(&hand, viewer)),
            ),
            Query::ValidActions { table_id, player_id } => {
                QueryResponse::ValidActions(tm.valid_actions(table_id, player_id)?)
            }
            Query::ListTournaments => {
                let mut views = Vec::new();
                for id in self.tournaments.tournament_ids() {
                    views.push(TournamentView::from(&self.tournaments.tournament(id)?));
                }
                QueryResponse::Tournaments(views)
            }
            Query::GetTournament { tournament_id } => {
                QueryResponse::Tournament(TournamentView::from(&self.tournaments.tournament(tournament_id)?))
            }
        };
        Ok(resp)
    }

    /// Раздачами турнирных столов управляет менеджер турниров.
    fn ensure_cash_table(&self, table_id: crate::domain::TableId) -> Result<(), ApiError> {
        match self.tables.table(table_id)?.tournament_id {
            None => Ok(()),
            Some(t) => Err(ApiError::bad_request(format!(
                "стол {table_id} принадлежит турниру {t}"
            ))),
        }
    }
}
