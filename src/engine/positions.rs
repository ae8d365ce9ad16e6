use crate::domain::hand::HandRound;
use crate::domain::player::PlayerInHand;
use crate::domain::{SeatIndex, Table};

/// Дилер и блайнды одной раздачи.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindPositions {
    pub dealer: SeatIndex,
    pub small_blind: SeatIndex,
    pub big_blind: SeatIndex,
}

/// Следующее место с активным игроком (фишки > 0, не sitting out), по кругу.
pub fn next_active_seat(table: &Table, start: SeatIndex, include_start: bool) -> Option<SeatIndex> {
    let max = table.seats.len();
    if max == 0 {
        return None;
    }

    let first = if include_start { 0 } else { 1 };
    (first..first + max)
        .map(|off| ((start as usize + off) % max) as SeatIndex)
        .find(|&s| table.seat(s).map(|p| p.is_active()).unwrap_or(false))
}

/// Все активные места по кругу, начиная со `start` (включительно).
pub fn active_seats_from(table: &Table, start: SeatIndex) -> Vec<SeatIndex> {
    let max = table.seats.len();
    (0..max)
        .map(|off| ((start as usize + off) % max) as SeatIndex)
        .filter(|&s| table.seat(s).map(|p| p.is_active()).unwrap_or(false))
        .collect()
}

/// Новая позиция кнопки: следующее активное место после текущей кнопки,
/// либо первое активное, если раздач ещё не было.
pub fn next_dealer(table: &Table) -> Option<SeatIndex> {
    match table.dealer_button {
        Some(button) => next_active_seat(table, button, false),
        None => next_active_seat(table, 0, true),
    }
}

/// Кнопка и блайнды для следующей раздачи.
///
/// Хедз-ап: дилер ставит малый блайнд.
pub fn blind_positions(table: &Table) -> Option<BlindPositions> {
    let dealer = next_dealer(table)?;
    let order = active_seats_from(table, dealer);
    match order.len() {
        0 | 1 => None,
        2 => Some(BlindPositions {
            dealer,
            small_blind: order[0],
            big_blind: order[1],
        }),
        _ => Some(BlindPositions {
            dealer,
            small_blind: order[1],
            big_blind: order[2],
        }),
    }
}

/// Первый игрок раздачи после места `after` (по кругу, не включая его),
/// удовлетворяющий условию.
pub fn next_player_after<F>(hand: &HandRound, after: SeatIndex, pred: F) -> Option<SeatIndex>
where
    F: Fn(&PlayerInHand) -> bool,
{
    let n = hand.players.len();
    if n == 0 {
        return None;
    }
    // players отсортированы по месту: старт с первого места строго после `after`.
    let start = hand
        .players
        .iter()
        .position(|p| p.seat > after)
        .unwrap_or(0);

    (0..n)
        .map(|off| &hand.players[(start + off) % n])
        .find(|p| p.seat != after && pred(p))
        .map(|p| p.seat)
}
