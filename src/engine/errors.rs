use thiserror::Error;

use crate::domain::deck::InsufficientCards;
use crate::domain::tournament::TournamentStatus;
use crate::domain::{Chips, PlayerId, TableId, TournamentId};
use crate::engine::actions::ActionKind;
use crate::eval::EvalError;
use crate::infra::ledger::LedgerError;
use crate::infra::persistence::StorageError;

/// Класс ошибки для внешнего кода (коды ответа, ретраи, алерты).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Некорректный ввод: сумма, конфиг, размер стола.
    Validation,
    /// Не твой ход или действие не входит в допустимые.
    IllegalAction,
    InsufficientPlayers,
    NotFound,
    /// Стол полон, уже сидит, уже зарегистрирован, раздача идёт.
    ResourceConflict,
    /// Кончились карты. Фатально для раздачи.
    InsufficientCards,
    Ledger,
    Internal,
}

/// Ошибки движка, столов и турниров.
#[derive(Debug, Error)]
pub enum PokerError {
    #[error("Некорректные данные: {0}")]
    Validation(String),

    #[error("Сейчас не ход игрока с id={0}")]
    NotPlayersTurn(PlayerId),

    #[error("Действие {action} недопустимо для игрока {player_id}")]
    IllegalAction { player_id: PlayerId, action: ActionKind },

    #[error("Раздача уже завершена")]
    HandComplete,

    #[error("Недостаточно игроков: нужно {required}, есть {available}")]
    InsufficientPlayers { required: usize, available: usize },

    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Турнир {0} не найден")]
    TournamentNotFound(TournamentId),

    #[error("Игрок {player_id} не сидит за столом {table_id}")]
    PlayerNotAtTable { player_id: PlayerId, table_id: TableId },

    #[error("Игрок {0} не участвует в раздаче")]
    PlayerNotInHand(PlayerId),

    #[error("Игрок {player_id} не зарегистрирован в турнире {tournament_id}")]
    NotRegistered { player_id: PlayerId, tournament_id: TournamentId },

    #[error("За столом {0} нет активной раздачи")]
    NoActiveHand(TableId),

    #[error("Стол {0} заполнен")]
    TableFull(TableId),

    #[error("Игрок {player_id} уже сидит за столом {table_id}")]
    AlreadySeated { player_id: PlayerId, table_id: TableId },

    #[error("Игрок {player_id} уже зарегистрирован в турнире {tournament_id}")]
    AlreadyRegistered { player_id: PlayerId, tournament_id: TournamentId },

    #[error("Игрок {player_id} уже выбыл из турнира {tournament_id}")]
    AlreadyEliminated { player_id: PlayerId, tournament_id: TournamentId },

    #[error("Ребай недоступен для игрока {0}")]
    RebuyNotAllowed(PlayerId),

    #[error("За столом {0} уже идёт раздача")]
    HandInProgress(TableId),

    #[error("У игрока {player_id} ещё {stack} фишек")]
    PlayerHasChips { player_id: PlayerId, stack: Chips },

    #[error("Турнир {0} заполнен")]
    TournamentFull(TournamentId),

    #[error("Турнир {tournament_id}: ожидался статус {expected:?}, сейчас {found:?}")]
    InvalidTournamentStatus {
        tournament_id: TournamentId,
        expected: TournamentStatus,
        found: TournamentStatus,
    },

    #[error(transparent)]
    InsufficientCards(#[from] InsufficientCards),

    #[error("Ошибка оценки руки: {0}")]
    Eval(#[from] EvalError),

    #[error("Ошибка леджера: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Ошибка хранилища: {0}")]
    Storage(#[from] StorageError),

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}

impl PokerError {
    pub fn kind(&self) -> ErrorKind {
        use PokerError::*;
        match self {
            Validation(_) => ErrorKind::Validation,
            NotPlayersTurn(_) | IllegalAction { .. } | HandComplete => ErrorKind::IllegalAction,
            InsufficientPlayers { .. } => ErrorKind::InsufficientPlayers,
            TableNotFound(_)
            | TournamentNotFound(_)
            | PlayerNotAtTable { .. }
            | PlayerNotInHand(_)
            | NotRegistered { .. }
            | NoActiveHand(_) => ErrorKind::NotFound,
            TableFull(_)
            | AlreadySeated { .. }
            | AlreadyRegistered { .. }
            | AlreadyEliminated { .. }
            | RebuyNotAllowed(_)
            | HandInProgress(_)
            | PlayerHasChips { .. }
            | TournamentFull(_)
            | InvalidTournamentStatus { .. } => ErrorKind::ResourceConflict,
            InsufficientCards(_) => ErrorKind::InsufficientCards,
            Ledger(_) => ErrorKind::Ledger,
            Eval(_) | Storage(_) | Internal(_) => ErrorKind::Internal,
        }
    }

    /// Действие отклонено без изменения состояния, можно повторить.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::InsufficientCards | ErrorKind::Internal)
    }
}
