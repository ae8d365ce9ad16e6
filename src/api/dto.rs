use serde::{Deserialize, Serialize};

use crate::domain::blinds::BlindLevel;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::{ActionRecord, HandRound, HandStatus, PotAward};
use crate::domain::table::{Table, TableKind};
use crate::domain::tournament::{Standing, Tournament, TournamentStatus};
use crate::domain::{HandId, PlayerId, SeatIndex, TableId, TournamentId};
use crate::engine::side_pots::SidePot;

/// Место за столом для фронта.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub stack: Chips,
    pub sitting_out: bool,
    pub is_bot: bool,
}

/// DTO стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableView {
    pub table_id: TableId,
    pub name: String,
    pub kind: TableKind,
    pub max_seats: u8,
    pub stakes: BlindLevel,
    pub seats: Vec<SeatView>,
    pub dealer_button: Option<SeatIndex>,
    pub current_hand_id: Option<HandId>,
    pub hands_played: u64,
    pub tournament_id: Option<TournamentId>,
}

impl From<&Table> for TableView {
    fn from(table: &Table) -> Self {
        let seats = table
            .seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.as_ref().map(|s| SeatView {
                    seat: i as SeatIndex,
                    player_id: s.player_id,
                    stack: s.stack,
                    sitting_out: s.sitting_out,
                    is_bot: s.is_bot,
                })
            })
            .collect();

        Self {
            table_id: table.id,
            name: table.name.clone(),
            kind: table.config.kind,
            max_seats: table.config.max_seats,
            stakes: table.config.stakes.clone(),
            seats,
            dealer_button: table.dealer_button,
            current_hand_id: table.current_hand_id,
            hands_played: table.hands_played,
            tournament_id: table.tournament_id,
        }
    }
}

/// Игрок в раздаче. `hole_cards` = None, если карты скрыты от зрителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandPlayerView {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub stack: Chips,
    pub round_bet: Chips,
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub is_bot: bool,
    pub hole_cards: Option<[Card; 2]>,
}

/// Раздача глазами конкретного зрителя. Колоды здесь нет.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandView {
    pub hand_id: HandId,
    pub table_id: TableId,
    pub hand_number: u64,
    pub status: HandStatus,
    pub community: Vec<Card>,
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub acting_seat: Option<SeatIndex>,
    pub dealer_seat: SeatIndex,
    pub small_blind_seat: SeatIndex,
    pub big_blind_seat: SeatIndex,
    pub players: Vec<HandPlayerView>,
    pub actions: Vec<ActionRecord>,
    pub awards: Vec<PotAward>,
}

/// Копия раздачи для зрителя `viewer`:
/// чужие карманные карты видны только на шоудауне и после него,
/// и только у тех, кто дошёл до вскрытия.
pub fn sanitize_for_player(hand: &HandRound, viewer: Option<PlayerId>) -> HandView {
    let revealed = matches!(hand.status, HandStatus::Showdown | HandStatus::Complete);

    let players = hand
        .players
        .iter()
        .map(|p| {
            let own = viewer == Some(p.player_id);
            let shown = own || (revealed && !p.folded && hand.live_count() > 1);
            HandPlayerView {
                player_id: p.player_id,
                seat: p.seat,
                stack: p.stack,
                round_bet: p.round_bet,
                total_bet: p.total_bet,
                folded: p.folded,
                all_in: p.all_in,
                is_bot: p.is_bot,
                hole_cards: shown.then_some(p.hole_cards),
            }
        })
        .collect();

    HandView {
        hand_id: hand.id,
        table_id: hand.table_id,
        hand_number: hand.hand_number,
        status: hand.status,
        community: hand.community.clone(),
        pot: hand.pot,
        side_pots: hand.side_pots.clone(),
        current_bet: hand.current_bet,
        min_raise: hand.min_raise,
        acting_seat: hand.acting_seat,
        dealer_seat: hand.dealer_seat,
        small_blind_seat: hand.small_blind_seat,
        big_blind_seat: hand.big_blind_seat,
        players,
        actions: hand.actions.clone(),
        awards: hand.awards.clone(),
    }
}

/// DTO турнира для лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentView {
    pub tournament_id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub buy_in: Chips,
    pub prize_pool: Chips,
    pub players_registered: u32,
    pub players_remaining: u32,
    pub current_level: usize,
    pub blinds: Option<BlindLevel>,
    pub next_blind_increase_at: Option<u64>,
    pub table_ids: Vec<TableId>,
    pub standings: Vec<Standing>,
}

impl From<&Tournament> for TournamentView {
    fn from(t: &Tournament) -> Self {
        Self {
            tournament_id: t.id,
            name: t.config.name.clone(),
            status: t.status,
            buy_in: t.config.buy_in,
            prize_pool: t.prize_pool,
            players_registered: t.registrations.len() as u32,
            players_remaining: t.remaining_count() as u32,
            current_level: t.current_level,
            blinds: t.current_blinds().ok().cloned(),
            next_blind_increase_at: t.next_blind_increase_at,
            table_ids: t.table_ids.clone(),
            standings: t.standings.clone(),
        }
    }
}
