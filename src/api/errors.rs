use serde::{Deserialize, Serialize};

use crate::engine::errors::{ErrorKind, PokerError};

/// Код ошибки для клиента.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    BadRequest,
    IllegalAction,
    InsufficientPlayers,
    NotFound,
    Conflict,
    Ledger,
    Internal,
}

/// Ошибка внешнего API (то, что отдаём фронту / клиенту).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// Состояние не изменилось, команду можно повторить.
    pub recoverable: bool,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::BadRequest,
            message: message.into(),
            recoverable: true,
        }
    }
}

impl From<PokerError> for ApiError {
    fn from(err: PokerError) -> Self {
        let code = match err.kind() {
            ErrorKind::Validation => ApiErrorCode::BadRequest,
            ErrorKind::IllegalAction => ApiErrorCode::IllegalAction,
            ErrorKind::InsufficientPlayers => ApiErrorCode::InsufficientPlayers,
            ErrorKind::NotFound => ApiErrorCode::NotFound,
            ErrorKind::ResourceConflict => ApiErrorCode::Conflict,
            ErrorKind::Ledger => ApiErrorCode::Ledger,
            ErrorKind::InsufficientCards | ErrorKind::Internal => ApiErrorCode::Internal,
        };
        Self {
            code,
            recoverable: err.is_recoverable(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
