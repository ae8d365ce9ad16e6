//! Шоудаун, сайд-поты и остаток от деления банка.
//!
//! Колода и карманные карты подменяются после старта раздачи,
//! чтобы исход был известен заранее.

use holdem_engine::domain::blinds::BlindLevel;
use holdem_engine::domain::card::{parse_cards, Card};
use holdem_engine::domain::chips::Chips;
use holdem_engine::domain::deck::Deck;
use holdem_engine::domain::hand::{HandRound, HandStatus, OddChipPolicy};
use holdem_engine::domain::player::PlayerInHand;
use holdem_engine::domain::table::{Seat, Table, TableConfig};
use holdem_engine::engine::{compute_side_pots, process_action, start_hand, PlayerAction};
use holdem_engine::infra::rng::DeterministicRng;

fn cards(s: &str) -> Vec<Card> {
    parse_cards(s).expect("bad cards in test")
}

fn table(stacks: &[u64]) -> Table {
    let mut t = Table::new(1, "T".into(), TableConfig::cash(6, 10, 20));
    for (i, &s) in stacks.iter().enumerate() {
        t.seats[i] = Some(Seat::new(i as u64 + 1, Chips(s), false));
    }
    t
}

fn start(t: &mut Table, blinds: BlindLevel, policy: OddChipPolicy) -> HandRound {
    let mut rng = DeterministicRng::from_u64(5);
    start_hand(t, &blinds, &mut rng, 1, 0, policy).expect("start_hand").hand
}

/// Подменить карманные карты (по порядку игроков) и будущий борд.
/// Сжигаемые карты берутся из `burns`.
fn rig(hand: &mut HandRound, holes: &[&str], board: &str, burns: &str) {
    for (p, h) in hand.players.iter_mut().zip(holes) {
        let c = cards(h);
        p.hole_cards = [c[0], c[1]];
    }
    let b = cards(board);
    let x = cards(burns);
    hand.deck = Deck {
        cards: vec![x[0], b[0], b[1], b[2], x[1], b[3], x[2], b[4]],
    };
}

fn act(hand: &mut HandRound, action: PlayerAction) {
    process_action(hand, action, 1).expect("action must be legal");
}

fn check_around(hand: &mut HandRound, order: &[u64]) {
    for &pid in order {
        act(hand, PlayerAction::check(pid));
    }
}

fn in_hand(id: u64, stack: u64, total: u64, folded: bool) -> PlayerInHand {
    let c = cards("2c 3d");
    let mut p = PlayerInHand::new(id, id as u8, Chips(stack), [c[0], c[1]], false);
    p.commit(Chips(total));
    p.folded = folded;
    p
}

//
// TEST 1 — расчёт уровней банка
//

#[test]
fn short_all_in_caps_main_pot() {
    // A all-in на 50, B довёл вклад до 200.
    let pots = compute_side_pots(&[in_hand(1, 50, 50, false), in_hand(2, 500, 200, false)]);
    assert_eq!(pots.len(), 2);
    assert_eq!(pots[0].amount, Chips(100));
    assert_eq!(pots[0].eligible, vec![1, 2]);
    assert_eq!(pots[1].amount, Chips(150));
    assert_eq!(pots[1].eligible, vec![2]);
}

#[test]
fn three_tiers_sum_to_total_pot() {
    let players = [
        in_hand(1, 100, 100, false),
        in_hand(2, 150, 150, false),
        in_hand(3, 1_000, 300, false),
        in_hand(4, 1_000, 40, true),
    ];
    let pots = compute_side_pots(&players);
    let amounts: Vec<Chips> = pots.iter().map(|p| p.amount).collect();
    assert_eq!(amounts, vec![Chips(340), Chips(100), Chips(150)]);
    assert_eq!(pots[0].eligible, vec![1, 2, 3], "сфолдивший не претендует на банк");
    assert_eq!(pots[1].eligible, vec![2, 3]);
    assert_eq!(pots[2].eligible, vec![3]);

    let total: Chips = players.iter().map(|p| p.total_bet).sum();
    assert_eq!(amounts.into_iter().sum::<Chips>(), total);
}

//
// TEST 2 — шоудаун с сайд-потом
//

#[test]
fn all_in_player_wins_only_main_pot() {
    let mut t = table(&[50, 1_000, 1_000]);
    let mut hand = start(&mut t, BlindLevel::cash(10, 20), OddChipPolicy::Discard);
    rig(&mut hand, &["Ah Ad", "Kh Kd", "7s 2d"], "3c 8s 9d Jc 4h", "5s 6s Ts");

    act(&mut hand, PlayerAction::all_in(1));
    act(&mut hand, PlayerAction::call(2));
    act(&mut hand, PlayerAction::call(3));
    assert_eq!(hand.status, HandStatus::Flop);
    assert_eq!(hand.pot, Chips(150));
    assert_eq!(hand.total_committed(), hand.pot);

    act(&mut hand, PlayerAction::bet(2, Chips(100)));
    act(&mut hand, PlayerAction::call(3));
    check_around(&mut hand, &[2, 3]);
    check_around(&mut hand, &[2, 3]);

    assert_eq!(hand.status, HandStatus::Complete);
    assert_eq!(hand.side_pots.len(), 2);
    assert_eq!(hand.side_pots[0].amount, Chips(150));
    assert_eq!(hand.side_pots[1].amount, Chips(200));
    assert_eq!(hand.side_pots[1].eligible, vec![2, 3]);

    assert_eq!(hand.player(1).unwrap().stack, Chips(150));
    assert_eq!(hand.player(2).unwrap().stack, Chips(1_050));
    assert_eq!(hand.player(3).unwrap().stack, Chips(850));
    assert_eq!(hand.pot, Chips::ZERO);
    assert!(hand.chips_conserved());

    let by_pot: Vec<(usize, u64)> = hand.awards.iter().map(|a| (a.pot_index, a.player_id)).collect();
    assert_eq!(by_pot, vec![(0, 1), (1, 2)]);
}

//
// TEST 3 — делёж поровну и лишняя фишка
//

/// Три игрока, анте 1: первый фолдит, двое других делят банк 43.
fn split_hand(policy: OddChipPolicy) -> HandRound {
    let mut t = table(&[1_000, 1_000, 1_000]);
    let mut hand = start(&mut t, BlindLevel::new(Chips(10), Chips(20), Chips(1), 0), policy);
    rig(&mut hand, &["9h 9d", "3c 4d", "3d 4c"], "As Ks Qd 7c 2h", "5h 6h 8h");

    act(&mut hand, PlayerAction::fold(1));
    act(&mut hand, PlayerAction::call(2));
    act(&mut hand, PlayerAction::check(3));
    assert_eq!(hand.pot, Chips(43));
    for _ in 0..3 {
        check_around(&mut hand, &[2, 3]);
    }
    assert_eq!(hand.status, HandStatus::Complete);
    hand
}

#[test]
fn odd_chip_is_left_undistributed_by_default() {
    let hand = split_hand(OddChipPolicy::Discard);

    assert_eq!(hand.player(2).unwrap().winnings, Chips(21));
    assert_eq!(hand.player(3).unwrap().winnings, Chips(21));
    assert_eq!(hand.undistributed, Chips(1));
    assert_eq!(hand.pot, Chips(1), "невыплаченная фишка остаётся в банке");
    assert!(hand.chips_conserved());
}

#[test]
fn odd_chip_goes_to_first_winner_left_of_dealer() {
    let hand = split_hand(OddChipPolicy::FirstLeftOfDealer);

    assert_eq!(hand.player(2).unwrap().winnings, Chips(22));
    assert_eq!(hand.player(3).unwrap().winnings, Chips(21));
    assert_eq!(hand.undistributed, Chips::ZERO);
    assert_eq!(hand.pot, Chips::ZERO);
    assert!(hand.chips_conserved());
}

#[test]
fn everyone_all_in_runs_board_out() {
    let mut t = table(&[300, 300]);
    let mut hand = start(&mut t, BlindLevel::cash(10, 20), OddChipPolicy::Discard);
    rig(&mut hand, &["Qc Qd", "Jh Kd"], "2s 7h 9c 3d 5s", "4c 6c 8c");

    act(&mut hand, PlayerAction::all_in(1));
    // Стек BB меньше долга: допустим только all-in.
    let out = process_action(&mut hand, PlayerAction::all_in(2), 2).unwrap();

    assert!(out.completed);
    assert!(out.street_changed);
    assert_eq!(hand.community, cards("2s 7h 9c 3d 5s"));
    assert_eq!(hand.player(1).unwrap().stack, Chips(600));
    assert_eq!(hand.player(2).unwrap().stack, Chips::ZERO);
    assert!(hand.chips_conserved());
}
