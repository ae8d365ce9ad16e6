use crate::domain::card::Rank;

/// Битовая маска рангов: бит 0 = двойка, бит 12 = туз.
pub type RankMask = u16;

/// Маски всех стритов, индекс = старшая карта минус 5
/// (0 = колесо A2345, 9 = бродвей TJQKA).
pub const STRAIGHT_MASKS: [RankMask; 10] = [
    mask_from_ranks(&[Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five]),
    mask_from_ranks(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six]),
    mask_from_ranks(&[Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven]),
    mask_from_ranks(&[Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight]),
    mask_from_ranks(&[Rank::Five, Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine]),
    mask_from_ranks(&[Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine, Rank::Ten]),
    mask_from_ranks(&[Rank::Seven, Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack]),
    mask_from_ranks(&[Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen]),
    mask_from_ranks(&[Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King]),
    mask_from_ranks(&[Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]),
];

pub const fn rank_to_bit(rank: Rank) -> RankMask {
    1 << (rank as u8 - 2)
}

pub const fn mask_from_ranks(ranks: &[Rank]) -> RankMask {
    let mut mask: RankMask = 0;
    let mut i = 0;
    while i < ranks.len() {
        mask |= rank_to_bit(ranks[i]);
        i += 1;
    }
    mask
}

/// Значение старшей карты стрита (5..=14), если в маске есть стрит.
/// Колесо A2345 даёт 5.
pub fn detect_straight(rank_mask: RankMask) -> Option<u8> {
    STRAIGHT_MASKS
        .iter()
        .enumerate()
        .rev()
        .find(|(_, &sm)| rank_mask & sm == sm)
        .map(|(i, _)| i as u8 + 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_is_five_high() {
        let m = mask_from_ranks(&[Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::King]);
        assert_eq!(detect_straight(m), Some(5));
    }

    #[test]
    fn longest_run_reports_highest_straight() {
        let m = mask_from_ranks(&[
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
        ]);
        assert_eq!(detect_straight(m), Some(9));
    }

    #[test]
    fn no_straight() {
        let m = mask_from_ranks(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Seven]);
        assert_eq!(detect_straight(m), None);
    }
}
