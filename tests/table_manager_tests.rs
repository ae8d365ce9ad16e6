//! Тесты менеджера столов: посадка, леджер, раздачи, боты, таймауты,
//! параллельная работа разных столов.

use std::sync::{Arc, Barrier};

use holdem_engine::config::EngineConfig;
use holdem_engine::domain::chips::Chips;
use holdem_engine::domain::card::Card;
use holdem_engine::domain::deck::Deck;
use holdem_engine::domain::hand::{HandRound, HandStatus};
use holdem_engine::domain::table::TableConfig;
use holdem_engine::domain::TableId;
use holdem_engine::engine::{ActionReport, EngineEvent, MemorySink, PlayerAction, PokerError, TableManager};
use holdem_engine::infra::ledger::LedgerEntry;
use holdem_engine::infra::rng::{DeterministicRng, ScriptedRng};
use holdem_engine::infra::{InMemoryLedger, InMemoryPokerStorage, PokerStorage, RngSeed};

struct Harness {
    tm: Arc<TableManager>,
    ledger: Arc<InMemoryLedger>,
    events: Arc<MemorySink>,
    storage: Arc<InMemoryPokerStorage>,
}

fn harness_with(rng: Box<dyn holdem_engine::engine::RandomSource + Send>) -> Harness {
    let ledger = Arc::new(InMemoryLedger::new());
    let events = Arc::new(MemorySink::new());
    let storage = Arc::new(InMemoryPokerStorage::new());
    let tm = Arc::new(TableManager::new(
        EngineConfig::default(),
        rng,
        ledger.clone(),
        events.clone(),
        storage.clone(),
    ));
    Harness {
        tm,
        ledger,
        events,
        storage,
    }
}

fn harness() -> Harness {
    harness_with(Box::new(DeterministicRng::from_u64(3)))
}

/// Стол 10/20 на 6 мест, бай-ин 400..4000. Игроки 1..=n с балансом 1000.
fn cash_table(h: &Harness, players: &[(u64, u64, bool)]) -> TableId {
    let id = h.tm.create_table("Cash", TableConfig::cash(6, 10, 20)).unwrap();
    for &(pid, buy_in, is_bot) in players {
        h.ledger.deposit(pid, Chips(1_000));
        h.tm.join(id, pid, Chips(buy_in), is_bot).unwrap();
    }
    id
}

//
// TEST 1 — посадка и деньги
//

#[test]
fn join_debits_buy_in_before_seating() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false)]);

    assert_eq!(h.ledger.balance(1), Chips(500));
    let table = h.tm.table(t).unwrap();
    assert_eq!(table.seat_of(1), Some(0));
    assert_eq!(table.total_chips(), Chips(500));
    assert!(matches!(h.ledger.journal()[0], LedgerEntry::Debit(_)));
}

#[test]
fn failed_buy_in_leaves_table_untouched() {
    let h = harness();
    let t = h.tm.create_table("Cash", TableConfig::cash(6, 10, 20)).unwrap();
    h.ledger.deposit(1, Chips(300));

    assert!(matches!(h.tm.join(t, 1, Chips(100), false), Err(PokerError::Validation(_))));
    assert!(matches!(h.tm.join(t, 1, Chips(500), false), Err(PokerError::Ledger(_))));
    assert_eq!(h.tm.table(t).unwrap().seated_count(), 0);
    assert_eq!(h.ledger.balance(1), Chips(300));
}

#[test]
fn seat_conflicts_are_reported() {
    let h = harness();
    let a = cash_table(&h, &[(1, 500, false)]);
    let b = h.tm.create_table("Small", TableConfig::cash(2, 10, 20)).unwrap();

    assert!(matches!(
        h.tm.join(b, 1, Chips(400), false),
        Err(PokerError::AlreadySeated { player_id: 1, table_id }) if table_id == a
    ));

    for pid in [2, 3, 4] {
        h.ledger.deposit(pid, Chips(1_000));
    }
    h.tm.join(b, 2, Chips(400), false).unwrap();
    h.tm.join(b, 3, Chips(400), false).unwrap();
    assert!(matches!(h.tm.join(b, 4, Chips(400), false), Err(PokerError::TableFull(_))));
    assert_eq!(h.ledger.balance(4), Chips(1_000));
}

//
// TEST 2 — раздача через менеджер
//

#[test]
fn hand_lifecycle_updates_table_stacks() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false)]);

    let report = h.tm.start_hand(t, 0).unwrap();
    assert_eq!(report.status, HandStatus::Preflop);
    assert_eq!(report.acting_player, Some(1));
    assert!(matches!(h.tm.start_hand(t, 0), Err(PokerError::HandInProgress(_))));
    assert!(h.tm.current_hand(t).unwrap().is_some());

    let v = h.tm.valid_actions(t, 1).unwrap();
    assert_eq!(v.call_amount, Chips(10));

    let report = h.tm.process_action(t, PlayerAction::fold(1), 1).unwrap();
    let completion = report.completion.expect("hand must complete");
    assert!(completion.busted.is_empty());
    assert_eq!(completion.awards[0].player_id, 2);

    let table = h.tm.table(t).unwrap();
    assert_eq!(table.hands_played, 1);
    assert!(!table.hand_in_progress());
    assert_eq!(table.seat(0).unwrap().stack, Chips(490));
    assert_eq!(table.seat(1).unwrap().stack, Chips(510));

    assert!(h.tm.current_hand(t).unwrap().is_none());
    assert!(h.tm.latest_hand(t).unwrap().unwrap().is_complete());
    assert!(matches!(h.tm.valid_actions(t, 1), Err(PokerError::NoActiveHand(_))));
    assert!(matches!(
        h.tm.process_action(t, PlayerAction::check(2), 2),
        Err(PokerError::NoActiveHand(_))
    ));
}

#[test]
fn events_and_storage_follow_the_hand() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false)]);
    let hand_id = h.tm.start_hand(t, 0).unwrap().hand_id;
    h.tm.process_action(t, PlayerAction::fold(1), 1).unwrap();

    let events = h.events.drain();
    assert!(matches!(events.first(), Some(EngineEvent::HandStarted { .. })));
    let hole = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::HoleCards { .. }))
        .count();
    assert_eq!(hole, 2);
    assert_eq!(events.iter().filter(|e| e.is_private()).count(), 2, "приватны только карманные карты");
    assert!(matches!(events.last(), Some(EngineEvent::HandComplete { .. })));
    assert!(h.events.is_empty());

    assert_eq!(h.storage.hand_count(), 1);
    let stored = h.storage.load_hand(hand_id).unwrap().expect("раздача сохранена");
    assert_eq!(stored.status, HandStatus::Complete);
    let table = h.storage.load_table(t).unwrap().expect("стол сохранён");
    assert_eq!(table.hands_played, 1);
    assert!(h.storage.load_tournament(1).unwrap().is_none());
    let json = h.storage.export_json().unwrap();
    assert!(json.contains("\"hands_stored\": 1"));
}

#[test]
fn rejoin_waits_until_old_hand_finishes() {
    let h = harness();
    let t = cash_table(&h, &[(1, 1_000, false), (2, 1_000, false), (3, 1_000, false)]);
    h.tm.start_hand(t, 0).unwrap();

    // Дилер (игрок 1) ходит первым и уходит, не вложив ни фишки.
    assert_eq!(h.tm.leave(t, 1, 1).unwrap(), Chips(1_000));
    assert_eq!(h.ledger.balance(1), Chips(1_000));

    assert!(matches!(
        h.tm.join(t, 1, Chips(400), false),
        Err(PokerError::HandInProgress(_))
    ));
    assert_eq!(h.ledger.balance(1), Chips(1_000), "отказ в посадке не списывает бай-ин");

    let report = h.tm.process_action(t, PlayerAction::fold(2), 2).unwrap();
    assert!(report.completion.is_some());

    let seat = h.tm.join(t, 1, Chips(400), false).unwrap();
    let table = h.tm.table(t).unwrap();
    assert_eq!(table.seat(seat).unwrap().stack, Chips(400));
    assert_eq!(table.total_chips(), Chips(400 + 990 + 1_010));
    assert_eq!(h.ledger.balance(1), Chips(600));
}

#[test]
fn leave_mid_hand_folds_and_cashes_out() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false)]);
    h.tm.start_hand(t, 0).unwrap();

    let cash_out = h.tm.leave(t, 1, 1).unwrap();
    assert_eq!(cash_out, Chips(490));
    assert_eq!(h.ledger.balance(1), Chips(500 + 490));

    let table = h.tm.table(t).unwrap();
    assert_eq!(table.seated_count(), 1);
    assert_eq!(table.seat(1).unwrap().stack, Chips(510));
    assert!(matches!(h.tm.leave(t, 1, 2), Err(PokerError::PlayerNotAtTable { .. })));
}

#[test]
fn sitting_out_player_is_skipped() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false)]);
    h.tm.sit_out(t, 2, true).unwrap();
    assert!(matches!(
        h.tm.start_hand(t, 0),
        Err(PokerError::InsufficientPlayers { available: 1, .. })
    ));
    h.tm.sit_out(t, 2, false).unwrap();
    assert!(h.tm.start_hand(t, 0).is_ok());
}

//
// TEST 3 — вылет и ребай (колода без тасовки)
//

#[test]
fn busted_players_can_rebuy() {
    // 1.0 → next_below(n) = n-1: Fisher–Yates ничего не переставляет.
    let h = harness_with(Box::new(ScriptedRng::new(vec![1.0])));
    let t = cash_table(&h, &[(1, 400, false), (2, 400, false), (3, 400, false)]);

    h.tm.start_hand(t, 0).unwrap();
    h.tm.process_action(t, PlayerAction::all_in(1), 1).unwrap();
    h.tm.process_action(t, PlayerAction::all_in(2), 1).unwrap();
    let report = h.tm.process_action(t, PlayerAction::all_in(3), 1).unwrap();

    // Борд 9c Tc Jc Kc 2d: у всех флеш, старший у 4c 7c.
    let completion = report.completion.expect("all-in run out");
    assert_eq!(completion.busted, vec![(1, Chips(400)), (2, Chips(400))]);
    assert_eq!(h.tm.table(t).unwrap().seat(2).unwrap().stack, Chips(1_200));

    assert!(matches!(h.tm.rebuy(t, 3, Chips(400)), Err(PokerError::RebuyNotAllowed(3))));
    assert!(h.tm.rebuy(t, 1, Chips(50)).is_err());
    h.tm.rebuy(t, 1, Chips(400)).unwrap();
    assert_eq!(h.ledger.balance(1), Chips(200));
    assert_eq!(h.tm.table(t).unwrap().seat(0).unwrap().stack, Chips(400));
}

//
// TEST 4 — таймаут хода
//

#[test]
fn turn_timeout_folds_owing_player() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false)]);
    h.tm.start_hand(t, 100).unwrap();

    assert!(h.tm.enforce_turn_timeout(t, 130).unwrap().is_none());
    let report = h.tm.enforce_turn_timeout(t, 131).unwrap().expect("timeout");
    assert!(report.completion.is_some());
    assert_eq!(h.tm.table(t).unwrap().seat(1).unwrap().stack, Chips(510));
    assert!(h.tm.enforce_turn_timeout(t, 500).unwrap().is_none());
}

//
// TEST 5 — боты доигрывают раздачу без внешних вызовов
//

#[test]
fn bots_finish_hand_after_human_folds() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, true), (3, 500, true)]);

    let report = h.tm.start_hand(t, 0).unwrap();
    assert_eq!(report.acting_player, Some(1), "первым ходит человек на кнопке");
    assert_eq!(report.bot_actions, 0);

    let report = h.tm.process_action(t, PlayerAction::fold(1), 1).unwrap();
    assert!(report.completion.is_some(), "оставшиеся боты доигрывают сами");
    assert!(report.bot_actions >= 1);

    let hand = h.tm.latest_hand(t).unwrap().unwrap();
    assert!(hand.chips_conserved());
    let table = h.tm.table(t).unwrap();
    assert_eq!(table.total_chips() + hand.undistributed, Chips(1_500));
}

#[test]
fn close_table_returns_stacks() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 700, false)]);
    let mut released = h.tm.close_table(t).unwrap();
    released.sort();
    assert_eq!(released, vec![(1, Chips(500)), (2, Chips(700))]);
    assert_eq!(h.ledger.balance(1), Chips(1_000));
    assert_eq!(h.ledger.balance(2), Chips(1_000));
    assert!(matches!(h.tm.table(t), Err(PokerError::TableNotFound(_))));

    // Освободившиеся игроки могут сесть снова.
    let again = h.tm.create_table("Again", TableConfig::cash(6, 10, 20)).unwrap();
    assert!(h.tm.join(again, 1, Chips(400), false).is_ok());
}

//
// TEST 6 — разные столы работают параллельно
//

#[test]
fn separate_tables_progress_concurrently() {
    let h = harness();
    let tables: Vec<TableId> = (0..4u64)
        .map(|k| cash_table(&h, &[(k * 10 + 1, 500, true), (k * 10 + 2, 500, true), (k * 10 + 3, 500, true)]))
        .collect();

    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let results = rt.block_on(async {
        let mut handles = Vec::new();
        for &t in &tables {
            let tm = Arc::clone(&h.tm);
            handles.push(tokio::task::spawn_blocking(move || {
                let mut completed = 0;
                let mut undistributed = Chips::ZERO;
                for i in 0..20u64 {
                    match tm.start_hand(t, i) {
                        Ok(ActionReport {
                            completion: Some(c), ..
                        }) => {
                            completed += 1;
                            undistributed += c.undistributed;
                        }
                        Ok(_) => {}
                        Err(PokerError::InsufficientPlayers { .. }) => break,
                        Err(e) => panic!("table {t}: {e}"),
                    }
                }
                (completed, undistributed)
            }));
        }
        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    });

    assert!(results.iter().all(|&(c, _)| c >= 1));
    for (&t, &(_, undistributed)) in tables.iter().zip(&results) {
        let table = h.tm.table(t).unwrap();
        let hand = h.tm.latest_hand(t).unwrap().unwrap();
        assert!(hand.is_complete());
        assert_eq!(table.total_chips() + undistributed, Chips(1_500), "table {t}");
    }
}

#[test]
fn racing_actions_on_one_table_apply_once() {
    let h = harness();
    let t = cash_table(&h, &[(1, 500, false), (2, 500, false), (3, 500, false)]);
    let report = h.tm.start_hand(t, 0).unwrap();
    let actor = report.acting_player.unwrap();
    let before = h.tm.current_hand(t).unwrap().unwrap();

    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let results = rt.block_on(async {
        let barrier = Arc::new(Barrier::new(2));
        let mut handles = Vec::new();
        for _ in 0..2 {
            let tm = Arc::clone(&h.tm);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::task::spawn_blocking(move || {
                barrier.wait();
                tm.process_action(t, PlayerAction::call(actor), 1)
            }));
        }
        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "ровно один из двух ходов применён: {results:?}");
    let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(
        matches!(rejected, PokerError::NotPlayersTurn(p) if *p == actor),
        "{rejected:?}"
    );

    let hand = h.tm.current_hand(t).unwrap().unwrap();
    assert_eq!(hand.actions.len(), before.actions.len() + 1);
    assert_ne!(hand.acting_player().unwrap().player_id, actor);
    assert!(hand.chips_conserved());
}

//
// TEST 7 — колода раздачи выводится из базового seed
//

#[test]
fn hand_seed_makes_deck_independent_of_shared_rng() {
    let base = RngSeed::from_u64(77);
    let deal = |shared: u64| {
        let ledger = Arc::new(InMemoryLedger::new());
        let tm = TableManager::new(
            EngineConfig::default(),
            Box::new(DeterministicRng::from_u64(shared)),
            ledger.clone(),
            Arc::new(MemorySink::new()),
            Arc::new(InMemoryPokerStorage::new()),
        )
        .with_hand_seed(base.clone());
        let t = tm.create_table("Seeded", TableConfig::cash(6, 10, 20)).unwrap();
        for pid in 1..=3 {
            ledger.deposit(pid, Chips(1_000));
            tm.join(t, pid, Chips(500), false).unwrap();
        }
        tm.start_hand(t, 0).unwrap();
        (t, tm.current_hand(t).unwrap().unwrap())
    };

    let (t, a) = deal(1);
    let (_, b) = deal(999);
    let holes = |h: &HandRound| h.players.iter().map(|p| p.hole_cards).collect::<Vec<_>>();
    assert_eq!(holes(&a), holes(&b), "общий RNG не влияет на колоду");

    // Карманные карты: первые 2n карт колоды, стасованной seed-ом раздачи.
    let mut deck = Deck::new();
    deck.shuffle(&mut base.for_hand(t, a.id, a.hand_number).to_rng());
    let mut expected = deck.take(6).unwrap();
    assert_eq!(a.deck, deck, "остаток колоды совпадает");
    let mut dealt: Vec<Card> = holes(&a).into_iter().flatten().collect();
    expected.sort_by_key(|c| (c.rank, c.suit));
    dealt.sort_by_key(|c| (c.rank, c.suit));
    assert_eq!(dealt, expected);
}
