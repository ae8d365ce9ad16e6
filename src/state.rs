use linera_sdk::views::{linera_views, MapView, RegisterView, RootView, ViewStorageContext};

use crate::domain::hand::HandRound;
use crate::domain::table::Table;
use crate::domain::tournament::Tournament;
use crate::domain::{TableId, TournamentId};

/// Глобальное состояние покерного приложения на Linera.
///
/// Раскладка тех же записей, что пишет `PokerStorage`: столы, раздачи,
/// турниры. Раздача хранится целиком (вместе с колодой), поэтому наружу
/// её отдаём только через `api::sanitize_for_player`.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct PokerState {
    /// Все кэш- и турнирные столы.
    #[view(map)]
    pub tables: MapView<TableId, Table>,

    /// Текущая или последняя раздача каждого стола.
    #[view(map)]
    pub hands: MapView<TableId, HandRound>,

    #[view(map)]
    pub tournaments: MapView<TournamentId, Tournament>,

    /// Сколько всего раздач сыграно.
    #[view(register)]
    pub total_hands_played: RegisterView<u64>,
}
