use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindLevel;
use crate::domain::chips::Chips;
use crate::domain::table::{SeatIndex, TableConfig};
use crate::domain::tournament::{Standing, TournamentConfig};
use crate::domain::{PlayerId, TableId, TournamentId};
use crate::engine::actions::PlayerAction;
use crate::engine::table_manager::ActionReport;
use crate::tournament::TournamentProgress;

use super::dto::TableView;

/// Команда верхнего уровня. Закрытый набор: всё, что меняет состояние.
///
/// В Linera-режиме одна команда = одна операция (`PokerOperation::Command`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Столы и раздачи.
    Table(TableCommand),

    /// Турниры.
    Tournament(TournamentCommand),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableCommand {
    /// Создать кэш-стол.
    Create { name: String, config: TableConfig },

    Join {
        table_id: TableId,
        player_id: PlayerId,
        buy_in: Chips,
        is_bot: bool,
    },

    Leave { table_id: TableId, player_id: PlayerId },

    Rebuy {
        table_id: TableId,
        player_id: PlayerId,
        amount: Chips,
    },

    SitOut {
        table_id: TableId,
        player_id: PlayerId,
        sitting_out: bool,
    },

    /// Сменить ставки кэш-стола (действует со следующей раздачи).
    SetStakes { table_id: TableId, stakes: BlindLevel },

    Close { table_id: TableId },

    StartHand { table_id: TableId },

    /// Действие игрока. Для турнирного стола уходит в менеджер турниров.
    Act { table_id: TableId, action: PlayerAction },

    /// Проверить таймаут хода.
    EnforceTimeout { table_id: TableId },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentCommand {
    Create { config: TournamentConfig },

    Register {
        tournament_id: TournamentId,
        player_id: PlayerId,
        is_bot: bool,
    },

    Unregister {
        tournament_id: TournamentId,
        player_id: PlayerId,
    },

    Cancel { tournament_id: TournamentId },

    Start { tournament_id: TournamentId },

    /// Таймауты, уровни блайндов, новые раздачи.
    Tick { tournament_id: TournamentId },

    EliminatePlayer {
        tournament_id: TournamentId,
        player_id: PlayerId,
    },

    CheckComplete { tournament_id: TournamentId },

    AdvanceBlindLevel { tournament_id: TournamentId },

    DistributePrizes { tournament_id: TournamentId },

    BalanceTables { tournament_id: TournamentId },
}

/// Ответ на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    Ok,

    TableCreated(TableView),

    Seated { table_id: TableId, seat: SeatIndex },

    /// Сколько фишек вернулось игроку.
    CashedOut { player_id: PlayerId, amount: Chips },

    TableClosed { released: Vec<(PlayerId, Chips)> },

    Hand(ActionReport),

    /// Таймаут ещё не наступил.
    NoTimeout,

    TournamentCreated { tournament_id: TournamentId },

    TournamentProgress {
        report: Option<ActionReport>,
        progress: TournamentProgress,
    },

    Eliminated { player_id: PlayerId, place: u32 },

    TournamentComplete { completed: bool },

    BlindLevel { level: Option<usize> },

    Standings(Vec<Standing>),

    PlayersMoved(u32),
}
