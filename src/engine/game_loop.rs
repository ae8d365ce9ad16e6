use std::collections::HashMap;

use log::{debug, info};

use crate::domain::blinds::BlindLevel;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::hand::{ActionRecord, HandRound, HandStatus, OddChipPolicy, PotAward};
use crate::domain::player::PlayerInHand;
use crate::domain::table::Table;
use crate::domain::{HandId, PlayerId, SeatIndex};
use crate::engine::actions::{ActionKind, PlayerAction};
use crate::engine::errors::PokerError;
use crate::engine::events::EngineEvent;
use crate::engine::positions::{blind_positions, next_player_after};
use crate::engine::side_pots::compute_side_pots;
use crate::engine::validation::actions_for;
use crate::engine::RandomSource;
use crate::eval::{compare, evaluate_hole, HandValue};

/// Новая раздача плюс события, которые нужно опубликовать.
#[derive(Debug)]
pub struct StartedHand {
    pub hand: HandRound,
    pub events: Vec<EngineEvent>,
}

/// Результат применения действия.
#[derive(Debug, Default)]
pub struct ActionOutcome {
    pub events: Vec<EngineEvent>,
    pub street_changed: bool,
    pub completed: bool,
}

/// Старт новой раздачи:
/// - двигает кнопку к следующему активному месту;
/// - тасует свежую колоду и раздаёт карманные карты по порядку мест;
/// - постит анте, потом блайнды (не больше стека);
/// - назначает первого ходящего после большого блайнда.
///
/// Если после блайндов ставить некому, борд сразу допечатывается до шоудауна.
pub fn start_hand<R: RandomSource + ?Sized>(
    table: &mut Table,
    blinds: &BlindLevel,
    rng: &mut R,
    hand_id: HandId,
    now: u64,
    odd_chip_policy: OddChipPolicy,
) -> Result<StartedHand, PokerError> {
    if table.hand_in_progress() {
        return Err(PokerError::HandInProgress(table.id));
    }
    blinds.validate().map_err(PokerError::Validation)?;

    let available = table.active_count();
    if available < 2 {
        return Err(PokerError::InsufficientPlayers {
            required: 2,
            available,
        });
    }

    let pos = blind_positions(table).ok_or(PokerError::Internal("нет позиций блайндов"))?;

    let mut deck = Deck::new();
    deck.shuffle(rng);

    let seated: Vec<(SeatIndex, PlayerId, Chips, bool)> = table
        .seats
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.as_ref().map(|s| (i as SeatIndex, s)))
        .filter(|(_, s)| s.is_active())
        .map(|(i, s)| (i, s.player_id, s.stack, s.is_bot))
        .collect();

    let hole = deck.deal_hole(seated.len())?;
    let players: Vec<PlayerInHand> = seated
        .iter()
        .zip(hole)
        .map(|(&(seat, pid, stack, is_bot), cards)| PlayerInHand::new(pid, seat, stack, cards, is_bot))
        .collect();

    table.dealer_button = Some(pos.dealer);
    table.current_hand_id = Some(hand_id);

    let mut hand = HandRound {
        id: hand_id,
        table_id: table.id,
        hand_number: table.hands_played + 1,
        status: HandStatus::Preflop,
        deck,
        community: Vec::with_capacity(5),
        pot: Chips::ZERO,
        side_pots: Vec::new(),
        current_bet: Chips::ZERO,
        min_raise: blinds.big_blind,
        acting_seat: None,
        dealer_seat: pos.dealer,
        small_blind_seat: pos.small_blind,
        big_blind_seat: pos.big_blind,
        blinds: blinds.clone(),
        odd_chip_policy,
        players,
        actions: Vec::new(),
        awards: Vec::new(),
        undistributed: Chips::ZERO,
        started_at: now,
        last_action_at: now,
        completed_at: None,
    };

    let mut events = vec![EngineEvent::HandStarted {
        table_id: hand.table_id,
        hand_id,
        hand_number: hand.hand_number,
        dealer_seat: pos.dealer,
        small_blind_seat: pos.small_blind,
        big_blind_seat: pos.big_blind,
        players: hand.players.iter().map(|p| p.player_id).collect(),
    }];
    events.extend(hand.players.iter().map(|p| EngineEvent::HoleCards {
        table_id: hand.table_id,
        hand_id,
        player_id: p.player_id,
        cards: p.hole_cards,
    }));

    post_forced_bets(&mut hand);

    info!(
        "{:<32}{}",
        "hand started",
        format!(
            "table={} hand={} #{} dealer={} sb={} bb={} players={}",
            hand.table_id,
            hand.id,
            hand.hand_number,
            pos.dealer,
            pos.small_blind,
            pos.big_blind,
            hand.players.len()
        )
    );

    if should_run_out(&hand) {
        let mut outcome = ActionOutcome::default();
        run_out_and_showdown(&mut hand, now, &mut outcome)?;
        events.extend(outcome.events);
    } else {
        hand.acting_seat = next_actor(&hand, hand.big_blind_seat);
    }

    Ok(StartedHand { hand, events })
}

fn post_forced_bets(hand: &mut HandRound) {
    let BlindLevel {
        small_blind,
        big_blind,
        ante,
        ..
    } = hand.blinds.clone();

    let mut posted = Chips::ZERO;
    if !ante.is_zero() {
        for p in hand.players.iter_mut() {
            posted += p.commit_dead(ante);
        }
    }

    let (sb_seat, bb_seat) = (hand.small_blind_seat, hand.big_blind_seat);
    if let Some(p) = hand.players.iter_mut().find(|p| p.seat == sb_seat) {
        posted += p.commit(small_blind);
    }
    if let Some(p) = hand.players.iter_mut().find(|p| p.seat == bb_seat) {
        posted += p.commit(big_blind);
    }

    hand.pot += posted;
    hand.current_bet = big_blind;
    hand.min_raise = big_blind;
}

/// Применить действие игрока.
///
/// Сначала полная проверка (раздача идёт, ход этого игрока, действие допустимо),
/// только потом изменение состояния.
pub fn process_action(hand: &mut HandRound, action: PlayerAction, now: u64) -> Result<ActionOutcome, PokerError> {
    if !hand.status.is_betting_street() {
        return Err(PokerError::HandComplete);
    }

    let acting = hand
        .acting_player()
        .ok_or(PokerError::Internal("раздача идёт, но ход ничей"))?;
    if acting.player_id != action.player_id {
        return match hand.player(action.player_id) {
            Some(_) => Err(PokerError::NotPlayersTurn(action.player_id)),
            None => Err(PokerError::PlayerNotInHand(action.player_id)),
        };
    }

    let valid = actions_for(acting, hand.current_bet, hand.min_raise);
    if !valid.contains(action.kind) {
        return Err(PokerError::IllegalAction {
            player_id: action.player_id,
            action: action.kind,
        });
    }

    let seat = acting.seat;
    let idx = hand
        .index_of_seat(seat)
        .ok_or(PokerError::Internal("игрок без места в раздаче"))?;

    let committed = apply_chips(hand, idx, &action);
    hand.pot += committed;
    hand.players[idx].has_acted = true;
    hand.last_action_at = now;

    let mut outcome = ActionOutcome::default();
    record(hand, idx, action.kind, committed, now, &mut outcome);

    advance(hand, seat, now, &mut outcome)?;
    Ok(outcome)
}

/// Движение фишек для действия. Возвращает, сколько положено в банк.
fn apply_chips(hand: &mut HandRound, idx: usize, action: &PlayerAction) -> Chips {
    let current_bet = hand.current_bet;
    let min_raise = hand.min_raise;
    let player = &mut hand.players[idx];

    let committed = match action.kind {
        ActionKind::Fold => {
            player.folded = true;
            Chips::ZERO
        }
        ActionKind::Check => Chips::ZERO,
        ActionKind::Call => player.commit(player.owed(current_bet)),
        ActionKind::Bet => player.commit(action.amount.max(min_raise)),
        ActionKind::Raise => {
            let target = action.amount.max(current_bet + min_raise);
            player.commit(target.saturating_sub(player.round_bet))
        }
        ActionKind::AllIn => {
            let stack = player.stack;
            player.commit(stack)
        }
    };

    let new_bet = hand.players[idx].round_bet;
    if new_bet > current_bet {
        apply_raise(hand, idx, new_bet);
    }
    committed
}

/// Новая ставка улицы. Полный рейз (не меньше min_raise) меняет минимальный
/// рейз и снова открывает торговлю для остальных; неполный all-in только
/// поднимает ставку.
fn apply_raise(hand: &mut HandRound, idx: usize, new_bet: Chips) {
    let raise_size = new_bet - hand.current_bet;
    hand.current_bet = new_bet;

    if raise_size >= hand.min_raise {
        hand.min_raise = raise_size;
        for (i, p) in hand.players.iter_mut().enumerate() {
            if i != idx && p.can_act() {
                p.has_acted = false;
            }
        }
    }
}

fn record(hand: &mut HandRound, idx: usize, kind: ActionKind, amount: Chips, now: u64, outcome: &mut ActionOutcome) {
    let p = &hand.players[idx];
    hand.actions.push(ActionRecord {
        player_id: p.player_id,
        seat: p.seat,
        street: hand.status,
        kind,
        amount,
        round_bet_after: p.round_bet,
        at: now,
    });
    outcome.events.push(EngineEvent::ActionTaken {
        table_id: hand.table_id,
        hand_id: hand.id,
        player_id: p.player_id,
        kind,
        amount,
        pot_after: hand.pot,
    });
    debug!(
        "{:<32}{}",
        "action",
        format!(
            "hand={} player={} {} amount={} pot={}",
            hand.id, p.player_id, kind, amount, hand.pot
        )
    );
}

/// Сбросить карты игрока вне очереди (игрок ушёл из-за стола).
pub fn force_fold(hand: &mut HandRound, player_id: PlayerId, now: u64) -> Result<ActionOutcome, PokerError> {
    if !hand.status.is_betting_street() {
        return Err(PokerError::HandComplete);
    }
    let idx = hand
        .players
        .iter()
        .position(|p| p.player_id == player_id)
        .ok_or(PokerError::PlayerNotInHand(player_id))?;

    let mut outcome = ActionOutcome::default();
    if hand.players[idx].folded {
        return Ok(outcome);
    }

    let seat = hand.players[idx].seat;
    let was_acting = hand.acting_seat == Some(seat);

    hand.players[idx].folded = true;
    hand.players[idx].has_acted = true;
    hand.last_action_at = now;
    record(hand, idx, ActionKind::Fold, Chips::ZERO, now, &mut outcome);

    if was_acting || hand.live_count() <= 1 {
        advance(hand, seat, now, &mut outcome)?;
    }
    Ok(outcome)
}

/// Ход просрочен: с `last_action_at` прошло больше `timeout_secs`.
pub fn turn_expired(hand: &HandRound, now: u64, timeout_secs: u64) -> bool {
    hand.status.is_betting_street()
        && hand.acting_seat.is_some()
        && now.saturating_sub(hand.last_action_at) > timeout_secs
}

/// Действие за игрока по таймауту: check, если можно, иначе fold.
pub fn timeout_action(hand: &HandRound) -> Option<PlayerAction> {
    let player = hand.acting_player()?;
    let valid = actions_for(player, hand.current_bet, hand.min_raise);
    if valid.contains(ActionKind::Check) {
        Some(PlayerAction::check(player.player_id))
    } else {
        Some(PlayerAction::fold(player.player_id))
    }
}

/// Что дальше после действия игрока на месте `last_seat`.
fn advance(hand: &mut HandRound, last_seat: SeatIndex, now: u64, outcome: &mut ActionOutcome) -> Result<(), PokerError> {
    if hand.live_count() <= 1 {
        award_uncontested(hand, now, outcome);
        return Ok(());
    }

    if !round_complete(hand) {
        hand.acting_seat = next_actor(hand, last_seat);
        return Ok(());
    }

    if should_run_out(hand) {
        return run_out_and_showdown(hand, now, outcome);
    }

    if hand.status == HandStatus::River {
        return showdown(hand, now, outcome);
    }

    deal_next_street(hand, outcome)?;
    hand.acting_seat = next_actor(hand, hand.dealer_seat);
    Ok(())
}

/// Раунд ставок закрыт: все, кто может ставить, походили и уравняли.
fn round_complete(hand: &HandRound) -> bool {
    hand.players
        .iter()
        .filter(|p| p.can_act())
        .all(|p| p.has_acted && p.round_bet >= hand.current_bet)
}

/// Ставить больше некому: максимум один игрок с фишками и никто ничего не должен.
fn should_run_out(hand: &HandRound) -> bool {
    let mut able = hand.players.iter().filter(|p| p.can_act());
    let count = able.clone().count();
    count <= 1 && able.all(|p| p.owed(hand.current_bet).is_zero())
}

fn next_actor(hand: &HandRound, after: SeatIndex) -> Option<SeatIndex> {
    let current_bet = hand.current_bet;
    next_player_after(hand, after, |p| {
        p.can_act() && (!p.has_acted || p.round_bet < current_bet)
    })
}

fn deal_next_street(hand: &mut HandRound, outcome: &mut ActionOutcome) -> Result<(), PokerError> {
    let (next, cards) = match hand.status {
        HandStatus::Preflop => (HandStatus::Flop, hand.deck.deal_flop()?.to_vec()),
        HandStatus::Flop => (HandStatus::Turn, vec![hand.deck.deal_turn()?]),
        HandStatus::Turn => (HandStatus::River, vec![hand.deck.deal_river()?]),
        _ => return Err(PokerError::Internal("нет следующей улицы")),
    };

    hand.community.extend_from_slice(&cards);
    hand.status = next;
    hand.current_bet = Chips::ZERO;
    hand.min_raise = hand.blinds.big_blind;
    for p in hand.players.iter_mut() {
        p.round_bet = Chips::ZERO;
        p.has_acted = false;
    }

    outcome.street_changed = true;
    outcome.events.push(EngineEvent::StreetDealt {
        table_id: hand.table_id,
        hand_id: hand.id,
        street: next,
        cards,
    });
    debug!(
        "{:<32}{}",
        "street dealt",
        format!("hand={} street={:?} board={:?}", hand.id, next, hand.community)
    );
    Ok(())
}

/// Все, кто остался, в all-in: допечатываем борд без торговли.
fn run_out_and_showdown(hand: &mut HandRound, now: u64, outcome: &mut ActionOutcome) -> Result<(), PokerError> {
    hand.acting_seat = None;
    while hand.status != HandStatus::River {
        deal_next_street(hand, outcome)?;
    }
    showdown(hand, now, outcome)
}

/// Все, кроме одного, сфолдили: весь банк ему, карты не вскрываются.
fn award_uncontested(hand: &mut HandRound, now: u64, outcome: &mut ActionOutcome) {
    hand.side_pots = compute_side_pots(&hand.players);

    if let Some(idx) = hand.players.iter().position(|p| p.is_live()) {
        let amount = hand.pot;
        let winner = &mut hand.players[idx];
        winner.stack += amount;
        winner.winnings += amount;
        hand.awards.push(PotAward {
            player_id: winner.player_id,
            seat: winner.seat,
            pot_index: 0,
            amount,
            hand: None,
        });
        hand.pot = Chips::ZERO;
    }

    complete(hand, now, outcome);
}

/// Шоудаун: каждый уровень банка делится поровну между лучшими руками
/// среди допущенных к нему игроков.
fn showdown(hand: &mut HandRound, now: u64, outcome: &mut ActionOutcome) -> Result<(), PokerError> {
    hand.status = HandStatus::Showdown;
    hand.acting_seat = None;
    hand.side_pots = compute_side_pots(&hand.players);

    let mut values: HashMap<PlayerId, HandValue> = HashMap::new();
    for p in hand.players.iter().filter(|p| p.is_live()) {
        values.insert(p.player_id, evaluate_hole(&p.hole_cards, &hand.community)?);
    }

    let pots = hand.side_pots.clone();
    for (pot_index, pot) in pots.iter().enumerate() {
        let mut winners = best_of(&pot.eligible, &values);
        if winners.is_empty() || pot.amount.is_zero() {
            continue;
        }
        winners.sort_by_key(|&pid| seat_distance_from_dealer(hand, pid));

        let share = Chips(pot.amount.0 / winners.len() as u64);
        let remainder = Chips(pot.amount.0 % winners.len() as u64);

        for (i, &pid) in winners.iter().enumerate() {
            let mut amount = share;
            if i == 0 && hand.odd_chip_policy == OddChipPolicy::FirstLeftOfDealer {
                amount += remainder;
            }
            pay(hand, pot_index, pid, amount, values.get(&pid).cloned());
        }
        if hand.odd_chip_policy == OddChipPolicy::Discard {
            hand.undistributed += remainder;
        }
    }

    complete(hand, now, outcome);
    Ok(())
}

fn best_of(eligible: &[PlayerId], values: &HashMap<PlayerId, HandValue>) -> Vec<PlayerId> {
    let mut best: Option<&HandValue> = None;
    let mut winners = Vec::new();
    for pid in eligible {
        let Some(v) = values.get(pid) else { continue };
        match best.map(|b| compare(v, b)) {
            None | Some(core::cmp::Ordering::Greater) => {
                best = Some(v);
                winners.clear();
                winners.push(*pid);
            }
            Some(core::cmp::Ordering::Equal) => winners.push(*pid),
            Some(core::cmp::Ordering::Less) => {}
        }
    }
    winners
}

fn seat_distance_from_dealer(hand: &HandRound, player_id: PlayerId) -> u16 {
    let seat = hand.player(player_id).map(|p| p.seat).unwrap_or(hand.dealer_seat);
    (seat as u16 + 256 - hand.dealer_seat as u16 - 1) % 256
}

fn pay(hand: &mut HandRound, pot_index: usize, player_id: PlayerId, amount: Chips, value: Option<HandValue>) {
    if amount.is_zero() {
        return;
    }
    if let Some(p) = hand.players.iter_mut().find(|p| p.player_id == player_id) {
        p.stack += amount;
        p.winnings += amount;
        hand.pot -= amount;
        hand.awards.push(PotAward {
            player_id,
            seat: p.seat,
            pot_index,
            amount,
            hand: value,
        });
    }
}

fn complete(hand: &mut HandRound, now: u64, outcome: &mut ActionOutcome) {
    hand.status = HandStatus::Complete;
    hand.acting_seat = None;
    hand.completed_at = Some(now);
    hand.last_action_at = now;
    outcome.completed = true;

    outcome.events.push(EngineEvent::HandComplete {
        table_id: hand.table_id,
        hand_id: hand.id,
        awards: hand.awards.clone(),
        undistributed: hand.undistributed,
    });

    info!(
        "{:<32}{}",
        "hand complete",
        format!(
            "table={} hand={} awarded={} undistributed={} winners={:?}",
            hand.table_id,
            hand.id,
            hand.total_awarded(),
            hand.undistributed,
            hand.awards.iter().map(|a| a.player_id).collect::<Vec<_>>()
        )
    );
}
