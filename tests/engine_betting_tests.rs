//! Тесты машины состояний раздачи: блайнды, очерёдность, допустимые действия,
//! рейзы, улицы, таймауты.

use holdem_engine::domain::blinds::BlindLevel;
use holdem_engine::domain::chips::Chips;
use holdem_engine::domain::hand::{HandRound, HandStatus, OddChipPolicy};
use holdem_engine::domain::table::{Seat, Table, TableConfig};
use holdem_engine::engine::{
    force_fold, process_action, start_hand, timeout_action, turn_expired, valid_actions, ActionKind, PlayerAction,
    PokerError,
};
use holdem_engine::infra::rng::DeterministicRng;

/// Стол 10/20, игрок i сидит на месте i-1.
fn table(stacks: &[u64]) -> Table {
    let mut t = Table::new(1, "T".into(), TableConfig::cash(6, 10, 20));
    for (i, &s) in stacks.iter().enumerate() {
        t.seats[i] = Some(Seat::new(i as u64 + 1, Chips(s), false));
    }
    t
}

fn start_with(t: &mut Table, blinds: &BlindLevel) -> HandRound {
    let mut rng = DeterministicRng::from_u64(11);
    start_hand(t, blinds, &mut rng, 1, 0, OddChipPolicy::Discard)
        .expect("start_hand")
        .hand
}

fn start(t: &mut Table) -> HandRound {
    start_with(t, &BlindLevel::cash(10, 20))
}

fn act(hand: &mut HandRound, action: PlayerAction) {
    process_action(hand, action, 1).expect("action must be legal");
}

fn acting_id(hand: &HandRound) -> u64 {
    hand.acting_player().map(|p| p.player_id).expect("someone must act")
}

//
// TEST 1 — префлоп хедз-ап: SB = дилер, ходит первым
//

#[test]
fn heads_up_blinds_and_first_actor() {
    let mut t = table(&[1_000, 1_000]);
    let hand = start(&mut t);

    assert_eq!(hand.status, HandStatus::Preflop);
    assert_eq!(hand.pot, Chips(30));
    assert_eq!(hand.dealer_seat, 0);
    assert_eq!(hand.small_blind_seat, 0);
    assert_eq!(hand.big_blind_seat, 1);
    assert_eq!(hand.current_bet, Chips(20));
    assert_eq!(hand.acting_seat, Some(0), "хедз-ап префлоп первым ходит SB");
    assert_eq!(hand.deck.len(), 48);
    assert!(t.hand_in_progress());

    let v = valid_actions(&hand, 1).unwrap();
    assert_eq!(
        v.actions,
        vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise, ActionKind::AllIn]
    );
    assert_eq!(v.call_amount, Chips(10));
    assert_eq!(v.min_raise_to, Chips(40));
    assert_eq!(v.max_commit, Chips(1_000));
    assert!(hand.chips_conserved());
}

#[test]
fn big_blind_gets_option_then_flop() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::call(1));
    assert_eq!(acting_id(&hand), 2, "после колла SB у BB остаётся опция");
    let v = valid_actions(&hand, 2).unwrap();
    assert_eq!(v.actions, vec![ActionKind::Check, ActionKind::Raise, ActionKind::AllIn]);

    let out = process_action(&mut hand, PlayerAction::check(2), 2).unwrap();
    assert!(out.street_changed);
    assert_eq!(hand.status, HandStatus::Flop);
    assert_eq!(hand.community.len(), 3);
    assert_eq!(hand.deck.len(), 44);
    assert_eq!(hand.current_bet, Chips::ZERO);
    assert_eq!(hand.pot, Chips(40));
    // После флопа хедз-ап первым ходит BB (первый после дилера).
    assert_eq!(acting_id(&hand), 2);
}

//
// TEST 2 — три игрока, анте, короткий BB
//

#[test]
fn three_handed_first_actor_is_after_big_blind() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let hand = start(&mut t);
    assert_eq!((hand.dealer_seat, hand.small_blind_seat, hand.big_blind_seat), (0, 1, 2));
    assert_eq!(acting_id(&hand), 1);
}

#[test]
fn antes_are_dead_money_outside_round_bet() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let hand = start_with(&mut t, &BlindLevel::new(Chips(10), Chips(20), Chips(5), 0));

    assert_eq!(hand.pot, Chips(15 + 30));
    let sb = hand.player(2).unwrap();
    assert_eq!(sb.total_bet, Chips(15));
    assert_eq!(sb.round_bet, Chips(10));
    assert_eq!(hand.player(1).unwrap().round_bet, Chips::ZERO);
    assert_eq!(valid_actions(&hand, 1).unwrap().call_amount, Chips(20));
    assert!(hand.chips_conserved());
}

#[test]
fn short_big_blind_posts_what_it_has() {
    let mut t = table(&[1_000, 1_000, 15]);
    let hand = start(&mut t);

    let bb = hand.player(3).unwrap();
    assert_eq!(bb.total_bet, Chips(15));
    assert!(bb.all_in);
    assert_eq!(hand.pot, Chips(25));
    assert_eq!(hand.current_bet, Chips(20), "ставку к уравниванию задаёт номинальный BB");
    assert_eq!(valid_actions(&hand, 1).unwrap().call_amount, Chips(20));
}

//
// TEST 3 — проверки до изменения состояния
//

#[test]
fn out_of_turn_and_unknown_players_are_rejected() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let mut hand = start(&mut t);
    let before = hand.clone();

    assert!(matches!(
        process_action(&mut hand, PlayerAction::call(2), 1),
        Err(PokerError::NotPlayersTurn(2))
    ));
    assert!(matches!(
        process_action(&mut hand, PlayerAction::call(99), 1),
        Err(PokerError::PlayerNotInHand(99))
    ));
    assert_eq!(hand, before, "отклонённое действие ничего не меняет");
}

#[test]
fn check_when_owing_and_fold_when_free_are_illegal() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    assert!(matches!(
        process_action(&mut hand, PlayerAction::check(1), 1),
        Err(PokerError::IllegalAction {
            player_id: 1,
            action: ActionKind::Check
        })
    ));

    act(&mut hand, PlayerAction::call(1));
    assert!(matches!(
        process_action(&mut hand, PlayerAction::fold(2), 1),
        Err(PokerError::IllegalAction {
            player_id: 2,
            action: ActionKind::Fold
        })
    ));
}

#[test]
fn raise_and_bet_amounts_are_lifted_to_minimum() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::raise_to(1, Chips(25)));
    assert_eq!(hand.current_bet, Chips(40));
    assert_eq!(hand.player(1).unwrap().round_bet, Chips(40));
    assert_eq!(hand.min_raise, Chips(20));

    act(&mut hand, PlayerAction::call(2));
    assert_eq!(hand.status, HandStatus::Flop);

    act(&mut hand, PlayerAction::bet(2, Chips(5)));
    assert_eq!(hand.current_bet, Chips(20), "bet меньше BB подтягивается до BB");
    assert_eq!(hand.pot, Chips(100));
}

//
// TEST 4 — полный рейз переоткрывает торговлю, неполный all-in — нет
//

#[test]
fn full_raise_reopens_action() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::call(1));
    act(&mut hand, PlayerAction::call(2));
    act(&mut hand, PlayerAction::raise_to(3, Chips(60)));

    assert_eq!(hand.current_bet, Chips(60));
    assert_eq!(hand.min_raise, Chips(40));
    assert!(!hand.player(1).unwrap().has_acted);
    assert!(!hand.player(2).unwrap().has_acted);
    assert_eq!(acting_id(&hand), 1);
    assert_eq!(valid_actions(&hand, 2).unwrap().min_raise_to, Chips(100));
}

#[test]
fn short_all_in_raise_does_not_reopen_action() {
    let mut t = table(&[1_000, 1_000, 70]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::raise_to(1, Chips(60)));
    assert_eq!(hand.min_raise, Chips(40));
    act(&mut hand, PlayerAction::fold(2));
    act(&mut hand, PlayerAction::all_in(3));

    assert_eq!(hand.current_bet, Chips(70));
    assert_eq!(hand.min_raise, Chips(40), "неполный рейз не меняет min_raise");
    assert!(hand.player(1).unwrap().has_acted);
    assert_eq!(acting_id(&hand), 1);
    let valid = valid_actions(&hand, 1).unwrap();
    assert_eq!(valid.call_amount, Chips(10));
    assert_eq!(valid.actions, vec![ActionKind::Fold, ActionKind::Call], "торговля для него закрыта");

    let before = hand.clone();
    for action in [PlayerAction::raise_to(1, Chips(200)), PlayerAction::all_in(1)] {
        let kind = action.kind;
        assert!(matches!(
            process_action(&mut hand, action, 2),
            Err(PokerError::IllegalAction { action: got, .. }) if got == kind
        ));
    }
    assert_eq!(hand, before);

    // Колл закрывает торговлю: дальше ставить некому, борд допечатывается.
    let out = process_action(&mut hand, PlayerAction::call(1), 2).unwrap();
    assert!(out.completed);
    assert_eq!(hand.status, HandStatus::Complete);
    assert_eq!(hand.community.len(), 5);
    assert!(hand.chips_conserved());
}

//
// TEST 5 — завершение раздачи
//

#[test]
fn everyone_folds_to_last_player() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    let out = process_action(&mut hand, PlayerAction::fold(1), 3).unwrap();
    assert!(out.completed);
    assert_eq!(hand.status, HandStatus::Complete);
    assert_eq!(hand.completed_at, Some(3));
    assert_eq!(hand.pot, Chips::ZERO);
    assert_eq!(hand.player(2).unwrap().stack, Chips(1_010));
    assert_eq!(hand.awards.len(), 1);
    assert!(hand.awards[0].hand.is_none(), "без шоудауна рука не вскрывается");
    assert!(hand.community.is_empty());
    assert!(matches!(
        process_action(&mut hand, PlayerAction::check(2), 4),
        Err(PokerError::HandComplete)
    ));
}

#[test]
fn check_down_reaches_showdown() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::call(1));
    act(&mut hand, PlayerAction::check(2));
    for street in [HandStatus::Flop, HandStatus::Turn, HandStatus::River] {
        assert_eq!(hand.status, street);
        act(&mut hand, PlayerAction::check(2));
        act(&mut hand, PlayerAction::check(1));
    }

    assert_eq!(hand.status, HandStatus::Complete);
    assert_eq!(hand.community.len(), 5);
    assert_eq!(hand.deck.len(), 40);
    assert!(hand.awards.iter().all(|a| a.hand.is_some()));
    assert!(hand.chips_conserved());

    let stacks: Chips = hand.players.iter().map(|p| p.stack).sum();
    assert_eq!(stacks + hand.undistributed, Chips(2_000));
}

#[test]
fn action_log_is_append_only_in_order() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let mut hand = start(&mut t);

    act(&mut hand, PlayerAction::raise_to(1, Chips(50)));
    act(&mut hand, PlayerAction::call(2));
    act(&mut hand, PlayerAction::fold(3));

    let log: Vec<(u64, ActionKind, Chips)> = hand.actions.iter().map(|a| (a.player_id, a.kind, a.amount)).collect();
    assert_eq!(
        log,
        vec![
            (1, ActionKind::Raise, Chips(50)),
            (2, ActionKind::Call, Chips(40)),
            (3, ActionKind::Fold, Chips::ZERO),
        ]
    );
    assert!(hand.actions.iter().all(|a| a.street == HandStatus::Preflop));
}

//
// TEST 6 — таймауты и принудительный фолд
//

#[test]
fn timeout_checks_when_free_and_folds_when_owing() {
    let mut t = table(&[1_000, 1_000]);
    let mut hand = start(&mut t);

    assert!(!turn_expired(&hand, 30, 30), "ровно таймаут ещё не просрочен");
    assert!(turn_expired(&hand, 31, 30));
    assert_eq!(timeout_action(&hand), Some(PlayerAction::fold(1)));

    act(&mut hand, PlayerAction::call(1));
    assert_eq!(timeout_action(&hand), Some(PlayerAction::check(2)));
}

#[test]
fn force_fold_out_of_turn_keeps_current_actor() {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let mut hand = start(&mut t);

    force_fold(&mut hand, 3, 1).unwrap();
    assert!(hand.player(3).unwrap().folded);
    assert_eq!(acting_id(&hand), 1);

    act(&mut hand, PlayerAction::fold(1));
    assert_eq!(hand.status, HandStatus::Complete);
    // SB забирает свой блайнд и блайнд BB.
    assert_eq!(hand.player(2).unwrap().stack, Chips(1_020));
}

#[test]
fn start_requires_two_active_players() {
    let mut t = table(&[1_000, 0]);
    let mut rng = DeterministicRng::from_u64(1);
    let err = start_hand(&mut t, &BlindLevel::cash(10, 20), &mut rng, 1, 0, OddChipPolicy::Discard).unwrap_err();
    assert!(matches!(
        err,
        PokerError::InsufficientPlayers {
            required: 2,
            available: 1
        }
    ));
}
