use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{HandId, TableId, TournamentId};

/// Монотонные счётчики ID. Каждый начинается с 1.
///
/// `next_op_seq` нумерует операции леджера: номер входит в ключ,
/// так что два бай-ина одного игрока за одним столом не склеиваются.
#[derive(Debug)]
pub struct IdGenerator {
    table_counter: AtomicU64,
    tournament_counter: AtomicU64,
    hand_counter: AtomicU64,
    op_counter: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            table_counter: AtomicU64::new(1),
            tournament_counter: AtomicU64::new(1),
            hand_counter: AtomicU64::new(1),
            op_counter: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn next_table_id(&self) -> TableId {
        self.table_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_tournament_id(&self) -> TournamentId {
        self.tournament_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_hand_id(&self) -> HandId {
        self.hand_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_op_seq(&self) -> u64 {
        self.op_counter.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_table_id(), 1);
        assert_eq!(ids.next_table_id(), 2);
        assert_eq!(ids.next_hand_id(), 1);
        assert_eq!(ids.next_op_seq(), 1);
        assert_eq!(ids.next_tournament_id(), 1);
    }
}
