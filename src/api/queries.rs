use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, TableId, TournamentId};
use crate::engine::validation::ValidActions;

use super::dto::{HandView, TableView, TournamentView};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Query {
    ListTables,

    GetTable { table_id: TableId },

    /// Текущая (или последняя) раздача глазами зрителя.
    GetHand {
        table_id: TableId,
        viewer: Option<PlayerId>,
    },

    ValidActions { table_id: TableId, player_id: PlayerId },

    ListTournaments,

    GetTournament { tournament_id: TournamentId },
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum QueryResponse {
    Tables(Vec<TableView>),
    Table(TableView),
    Hand(Option<HandView>),
    ValidActions(ValidActions),
    Tournaments(Vec<TournamentView>),
    Tournament(TournamentView),
}
