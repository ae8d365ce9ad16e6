//! Тесты оценщика рук: категории, tiebreak, сравнение, поиск победителей.

use std::cmp::Ordering;

use holdem_engine::domain::card::{parse_cards, Card, Suit};
use holdem_engine::domain::deck::Deck;
use holdem_engine::eval::{compare, evaluate, evaluate_hole, find_winners, rank_hands, EvalError, HandCategory};
use holdem_engine::infra::rng::DeterministicRng;

fn cards(s: &str) -> Vec<Card> {
    parse_cards(s).expect("bad cards in test")
}

fn hole(s: &str) -> [Card; 2] {
    let v = cards(s);
    [v[0], v[1]]
}

//
// TEST 1 — категории
//

#[test]
fn royal_flush_is_category_ten() {
    let v = evaluate(&cards("Ah Kh Qh Jh Th 2c 3d")).unwrap();
    assert_eq!(v.category, HandCategory::RoyalFlush);
    assert_eq!(v.category.value(), 10);
}

#[test]
fn quads_with_kicker() {
    let v = evaluate(&cards("2c 2d 2h 2s 9c")).unwrap();
    assert_eq!(v.category, HandCategory::FourOfAKind);
    assert_eq!(v.tiebreak, vec![2, 9]);
}

#[test]
fn wheel_is_five_high_straight() {
    let v = evaluate(&cards("Ac 2d 3h 4s 5c Kd 9h")).unwrap();
    assert_eq!(v.category, HandCategory::Straight);
    assert_eq!(v.tiebreak, vec![5]);

    let six_high = evaluate(&cards("2d 3h 4s 5c 6d")).unwrap();
    assert_eq!(compare(&six_high, &v), Ordering::Greater);
}

#[test]
fn steel_wheel_is_straight_flush_not_royal() {
    let v = evaluate(&cards("Ah 2h 3h 4h 5h")).unwrap();
    assert_eq!(v.category, HandCategory::StraightFlush);
    assert_eq!(v.tiebreak, vec![5]);
}

#[test]
fn two_trips_make_full_house_with_higher_trips() {
    let v = evaluate(&cards("Kc Kd Kh 7s 7c 7d 2h")).unwrap();
    assert_eq!(v.category, HandCategory::FullHouse);
    assert_eq!(v.tiebreak, vec![13, 7]);
    assert_eq!(v.describe(), "Full house, Kings full of Sevens");
}

#[test]
fn three_pairs_use_best_two_and_best_kicker() {
    let v = evaluate(&cards("Ac Ad 9h 9s 4c 4d Kh")).unwrap();
    assert_eq!(v.category, HandCategory::TwoPair);
    assert_eq!(v.tiebreak, vec![14, 9, 13]);
}

#[test]
fn flush_beats_straight_and_uses_top_five() {
    let flush = evaluate(&cards("2h 5h 9h Jh Kh Ah")).unwrap();
    assert_eq!(flush.category, HandCategory::Flush);
    assert_eq!(flush.tiebreak, vec![14, 13, 11, 9, 5]);

    let straight = evaluate(&cards("9c Td Jh Qs Kc")).unwrap();
    assert_eq!(compare(&flush, &straight), Ordering::Greater);
}

//
// TEST 2 — ошибки ввода
//

#[test]
fn wrong_card_count_and_duplicates_are_rejected() {
    assert_eq!(evaluate(&cards("Ah Kh")), Err(EvalError::WrongCardCount(2)));
    assert_eq!(
        evaluate(&cards("Ah Kh Qh Jh Th 9h 8h 7h")),
        Err(EvalError::WrongCardCount(8))
    );
    let dup = cards("Ah Ah Qh Jh Th");
    assert_eq!(evaluate(&dup), Err(EvalError::DuplicateCard(dup[0])));
}

//
// TEST 3 — сравнение и победители
//

#[test]
fn kicker_decides_between_same_pairs() {
    let board = cards("Ad 7c 4h 2s 9d");
    let a = evaluate_hole(&hole("Ac Kd"), &board).unwrap();
    let b = evaluate_hole(&hole("Ah Qd"), &board).unwrap();
    assert_eq!(a.category, HandCategory::OnePair);
    assert_eq!(compare(&a, &b), Ordering::Greater);
    assert_eq!(compare(&b, &a), Ordering::Less);
}

#[test]
fn board_plays_for_everyone_gives_tie() {
    let board = cards("Ts Js Qs Ks As");
    let players = vec![(1, hole("2c 3d")), (2, hole("4h 5c")), (3, hole("7d 8d"))];
    let winners = find_winners(&players, &board).unwrap();
    assert_eq!(winners, vec![1, 2, 3]);
}

#[test]
fn rank_hands_sorts_strongest_first() {
    let board = cards("Kd Kc 7h 2s 3d");
    let players = vec![(1, hole("Qc Jd")), (2, hole("Kh 9c")), (3, hole("7c 7d"))];
    let ranked = rank_hands(&players, &board).unwrap();
    let order: Vec<u64> = ranked.iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![3, 2, 1]);
    assert_eq!(ranked[0].1.category, HandCategory::FullHouse);
    assert_eq!(find_winners(&players, &board).unwrap(), vec![3]);
}

#[test]
fn best_five_is_ordered_by_significance() {
    let v = evaluate(&cards("9c 9d Kh 4s 9h")).unwrap();
    assert_eq!(v.category, HandCategory::ThreeOfAKind);
    let ranks: Vec<u8> = v.best_five.iter().map(|c| c.rank.value()).collect();
    assert_eq!(ranks, vec![9, 9, 9, 13, 4]);
}

//
// TEST 4 — compare задаёт полный порядок на случайных руках
//

fn rotate_suits(hand: &[Card]) -> Vec<Card> {
    hand.iter()
        .map(|c| Card {
            rank: c.rank,
            suit: Suit::ALL[(c.suit.index() + 1) % 4],
        })
        .collect()
}

#[test]
fn compare_is_a_total_order_on_random_hands() {
    let mut rng = DeterministicRng::from_u64(2024);
    let mut values = Vec::new();
    for _ in 0..120 {
        let mut deck = Deck::new();
        deck.shuffle(&mut rng);
        let hand = deck.take(5).unwrap();
        let v = evaluate(&hand).unwrap();

        // Смена мастей по кругу не меняет силу руки.
        let same = evaluate(&rotate_suits(&hand)).unwrap();
        assert_eq!(compare(&v, &same), Ordering::Equal, "{hand:?}");
        values.push(v);
    }

    for a in &values {
        assert_eq!(compare(a, a), Ordering::Equal);
        for b in &values {
            let ab = compare(a, b);
            assert_eq!(ab, compare(b, a).reverse(), "антисимметрия");
            assert_eq!(
                ab == Ordering::Equal,
                a.category == b.category && a.tiebreak == b.tiebreak,
                "равенство только при совпадении категории и tiebreak"
            );
            for c in &values {
                if ab != Ordering::Greater && compare(b, c) != Ordering::Greater {
                    assert_ne!(compare(a, c), Ordering::Greater, "транзитивность");
                }
            }
        }
    }

    // Сортировка через compare согласована с попарным сравнением.
    let mut sorted = values.clone();
    sorted.sort_by(compare);
    assert!(sorted.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater));
}
