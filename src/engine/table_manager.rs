// src/engine/table_manager.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::bot;
use crate::config::EngineConfig;
use crate::domain::blinds::BlindLevel;
use crate::domain::hand::{HandRound, HandStatus, PotAward};
use crate::domain::table::{Seat, Table, TableConfig, TableKind};
use crate::domain::{Chips, HandId, PlayerId, SeatIndex, TableId, TournamentId};
use crate::engine::actions::PlayerAction;
use crate::engine::errors::PokerError;
use crate::engine::events::EventSink;
use crate::engine::game_loop::{self, ActionOutcome};
use crate::engine::validation::{valid_actions, ValidActions};
use crate::engine::RandomSource;
use crate::infra::ids::IdGenerator;
use crate::infra::ledger::{Ledger, LedgerOp, LedgerReason};
use crate::infra::persistence::PokerStorage;
use crate::infra::rng_seed::RngSeed;

/// Итог завершённой раздачи для менеджера турниров и внешнего кода.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandCompletion {
    pub table_id: TableId,
    pub hand_id: HandId,
    pub awards: Vec<PotAward>,
    pub undistributed: Chips,
    /// Игроки без фишек после раздачи и их стек на старте раздачи.
    pub busted: Vec<(PlayerId, Chips)>,
}

/// Результат вызова `start_hand` / `process_action` вместе с ходами ботов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionReport {
    pub table_id: TableId,
    pub hand_id: HandId,
    /// Статус раздачи после всех ходов (Complete, если раздача закончилась).
    pub status: HandStatus,
    /// Чей ход сейчас (человек), если раздача продолжается.
    pub acting_player: Option<PlayerId>,
    pub bot_actions: u32,
    pub completion: Option<HandCompletion>,
}

/// Внутренний объект: один стол + текущая раздача.
struct ManagedTable {
    table: Table,
    hand: Option<HandRound>,
    /// Последняя завершённая раздача (для просмотра истории).
    last_hand: Option<HandRound>,
}

/// Менеджер столов:
/// - хранит столы по TableId, каждый под своим замком;
/// - рассаживает игроков, двигает деньги через леджер;
/// - запускает раздачи и применяет действия, доигрывая ходы ботов.
///
/// Все изменения раздачи, включая цепочку ботов, идут под замком стола,
/// разные столы работают параллельно.
pub struct TableManager {
    tables: RwLock<HashMap<TableId, Arc<Mutex<ManagedTable>>>>,
    /// Где сидит игрок: один стол каждого типа.
    seated: Mutex<HashMap<(PlayerId, TableKind), TableId>>,
    ids: IdGenerator,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    /// Если задан, колода каждой раздачи тасуется своим seed из `RngSeed::for_hand`.
    hand_seed: Option<RngSeed>,
    ledger: Arc<dyn Ledger>,
    events: Arc<dyn EventSink>,
    storage: Arc<dyn PokerStorage>,
    config: EngineConfig,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, PokerError> {
    m.lock().map_err(|_| PokerError::Internal("mutex poisoned"))
}

impl TableManager {
    pub fn new(
        config: EngineConfig,
        rng: Box<dyn RandomSource + Send>,
        ledger: Arc<dyn Ledger>,
        events: Arc<dyn EventSink>,
        storage: Arc<dyn PokerStorage>,
    ) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            seated: Mutex::new(HashMap::new()),
            ids: IdGenerator::new(),
            rng: Mutex::new(rng),
            hand_seed: None,
            ledger,
            events,
            storage,
            config,
        }
    }

    /// Тасовать колоды от базового seed: раздача воспроизводится по
    /// (стол, hand_id, номер раздачи) независимо от соседних столов.
    pub fn with_hand_seed(mut self, seed: RngSeed) -> Self {
        self.hand_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    pub fn storage(&self) -> &Arc<dyn PokerStorage> {
        &self.storage
    }

    // ------------------------------------------------------------------
    // Столы
    // ------------------------------------------------------------------

    /// Создать кэш-стол.
    pub fn create_table(&self, name: impl Into<String>, config: TableConfig) -> Result<TableId, PokerError> {
        self.insert_table(name.into(), config, None)
    }

    /// Создать стол турнира (без бай-инов через леджер).
    pub fn create_tournament_table(
        &self,
        name: impl Into<String>,
        max_seats: u8,
        blinds: BlindLevel,
        tournament_id: TournamentId,
    ) -> Result<TableId, PokerError> {
        let config = TableConfig {
            max_seats,
            kind: TableKind::Tournament,
            stakes: blinds,
            min_buy_in: Chips::ZERO,
            max_buy_in: Chips::ZERO,
        };
        self.insert_table(name.into(), config, Some(tournament_id))
    }

    fn insert_table(
        &self,
        name: String,
        config: TableConfig,
        tournament_id: Option<TournamentId>,
    ) -> Result<TableId, PokerError> {
        config.validate().map_err(PokerError::Validation)?;

        let id = self.ids.next_table_id();
        let mut table = Table::new(id, name, config);
        table.tournament_id = tournament_id;
        self.persist_table(&table);

        let managed = ManagedTable {
            table,
            hand: None,
            last_hand: None,
        };
        self.tables
            .write()
            .map_err(|_| PokerError::Internal("rwlock poisoned"))?
            .insert(id, Arc::new(Mutex::new(managed)));

        info!("{:<32}{}", "table created", format!("table={id} tournament={tournament_id:?}"));
        Ok(id)
    }

    fn get(&self, table_id: TableId) -> Result<Arc<Mutex<ManagedTable>>, PokerError> {
        self.tables
            .read()
            .map_err(|_| PokerError::Internal("rwlock poisoned"))?
            .get(&table_id)
            .cloned()
            .ok_or(PokerError::TableNotFound(table_id))
    }

    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self
            .tables
            .read()
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Снимок стола.
    pub fn table(&self, table_id: TableId) -> Result<Table, PokerError> {
        let mt = self.get(table_id)?;
        let mt = lock(&mt)?;
        Ok(mt.table.clone())
    }

    /// Снимок текущей раздачи (если она идёт).
    pub fn current_hand(&self, table_id: TableId) -> Result<Option<HandRound>, PokerError> {
        let mt = self.get(table_id)?;
        let mt = lock(&mt)?;
        Ok(mt.hand.clone())
    }

    /// Текущая раздача, а если её нет, последняя завершённая.
    pub fn latest_hand(&self, table_id: TableId) -> Result<Option<HandRound>, PokerError> {
        let mt = self.get(table_id)?;
        let mt = lock(&mt)?;
        Ok(mt.hand.clone().or_else(|| mt.last_hand.clone()))
    }

    pub fn valid_actions(&self, table_id: TableId, player_id: PlayerId) -> Result<ValidActions, PokerError> {
        let mt = self.get(table_id)?;
        let mt = lock(&mt)?;
        let hand = mt.hand.as_ref().ok_or(PokerError::NoActiveHand(table_id))?;
        valid_actions(hand, player_id)
    }

    // ------------------------------------------------------------------
    // Игроки
    // ------------------------------------------------------------------

    /// Сесть за кэш-стол с бай-ином. Деньги списываются до посадки.
    pub fn join(&self, table_id: TableId, player_id: PlayerId, buy_in: Chips, is_bot: bool) -> Result<SeatIndex, PokerError> {
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        let table = &mut mt.table;

        if table.config.kind != TableKind::Cash {
            return Err(PokerError::Validation(format!(
                "стол {table_id} турнирный, посадка только через турнир"
            )));
        }
        if buy_in < table.config.min_buy_in || buy_in > table.config.max_buy_in {
            return Err(PokerError::Validation(format!(
                "бай-ин {buy_in} вне диапазона [{}, {}]",
                table.config.min_buy_in, table.config.max_buy_in
            )));
        }
        let seat = self.check_can_seat(table, player_id)?;
        // Ушедший посреди раздачи числится в ней до конца раздачи.
        if player_in_hand(&mt, player_id) {
            return Err(PokerError::HandInProgress(table_id));
        }
        let table = &mut mt.table;

        let op = LedgerOp::new(
            format!("cash-buyin:{table_id}:{player_id}:{}", self.ids.next_op_seq()),
            player_id,
            buy_in,
            LedgerReason::CashBuyIn { table_id },
        );
        self.ledger.debit(&op)?;

        self.claim_seat(table, seat, player_id, buy_in, is_bot)?;
        Ok(seat)
    }

    /// Посадить игрока турнира со стартовым стеком (без леджера).
    pub fn seat_tournament_player(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        stack: Chips,
        is_bot: bool,
    ) -> Result<SeatIndex, PokerError> {
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        let table = &mut mt.table;
        let seat = self.check_can_seat(table, player_id)?;
        self.claim_seat(table, seat, player_id, stack, is_bot)?;
        Ok(seat)
    }

    fn check_can_seat(&self, table: &Table, player_id: PlayerId) -> Result<SeatIndex, PokerError> {
        if let Some(&other) = lock(&self.seated)?.get(&(player_id, table.config.kind)) {
            return Err(PokerError::AlreadySeated {
                player_id,
                table_id: other,
            });
        }
        table.first_empty_seat().ok_or(PokerError::TableFull(table.id))
    }

    fn claim_seat(
        &self,
        table: &mut Table,
        seat: SeatIndex,
        player_id: PlayerId,
        stack: Chips,
        is_bot: bool,
    ) -> Result<(), PokerError> {
        {
            let mut seated = lock(&self.seated)?;
            let key = (player_id, table.config.kind);
            if let Some(&other) = seated.get(&key) {
                return Err(PokerError::AlreadySeated {
                    player_id,
                    table_id: other,
                });
            }
            seated.insert(key, table.id);
        }

        table.seats[seat as usize] = Some(Seat::new(player_id, stack, is_bot));
        self.persist_table(table);
        debug!(
            "{:<32}{}",
            "player seated",
            format!("table={} seat={seat} player={player_id} stack={stack}", table.id)
        );
        Ok(())
    }

    fn release_seat(&self, table: &mut Table, player_id: PlayerId) -> Result<Seat, PokerError> {
        let idx = table.seat_of(player_id).ok_or(PokerError::PlayerNotAtTable {
            player_id,
            table_id: table.id,
        })?;
        let seat = table.seats[idx as usize]
            .take()
            .ok_or(PokerError::Internal("пустое место"))?;
        lock(&self.seated)?.remove(&(player_id, table.config.kind));
        self.persist_table(table);
        Ok(seat)
    }

    /// Встать из-за стола. Посреди раздачи карты сбрасываются,
    /// остаток стека возвращается через леджер (кэш-столы).
    pub fn leave(&self, table_id: TableId, player_id: PlayerId, now: u64) -> Result<Chips, PokerError> {
        let mt = self.get(table_id)?;
        let mut guard = lock(&mt)?;
        let mt = &mut *guard;

        if mt.table.seat_of(player_id).is_none() {
            return Err(PokerError::PlayerNotAtTable { player_id, table_id });
        }

        let mut report = None;
        let in_live_hand = mt
            .hand
            .as_ref()
            .and_then(|h| h.player(player_id))
            .map(|p| !p.folded)
            .unwrap_or(false);

        if in_live_hand {
            let outcome = match mt.hand.as_mut() {
                Some(hand) => game_loop::force_fold(hand, player_id, now)?,
                None => ActionOutcome::default(),
            };
            report = Some(self.after_outcome(mt, outcome, now, 0)?);
        }

        // Если раздача ещё идёт, фишки игрока живут в ней, а не в месте.
        let stack = match mt.hand.as_ref().and_then(|h| h.player(player_id)) {
            Some(p) => p.stack,
            None => mt
                .table
                .seat_of(player_id)
                .and_then(|i| mt.table.seat(i))
                .map(|s| s.stack)
                .unwrap_or_default(),
        };

        if mt.table.config.kind == TableKind::Cash && !stack.is_zero() {
            let op = LedgerOp::new(
                format!("cash-out:{table_id}:{player_id}:{}", self.ids.next_op_seq()),
                player_id,
                stack,
                LedgerReason::CashOut { table_id },
            );
            self.ledger.credit(&op)?;
        }

        self.release_seat(&mut mt.table, player_id)?;
        let hand_finished = report.map(|r| r.completion.is_some()).unwrap_or(false);
        info!(
            "{:<32}{}",
            "player left",
            format!("table={table_id} player={player_id} cash_out={stack} hand_finished={hand_finished}")
        );
        Ok(stack)
    }

    /// Снять вылетевшего игрока турнира со стола. Без леджера.
    /// Место освобождается только вне раздачи и при пустом стеке.
    pub fn remove_busted_player(&self, table_id: TableId, player_id: PlayerId) -> Result<Seat, PokerError> {
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        if player_in_hand(&mt, player_id) {
            return Err(PokerError::HandInProgress(table_id));
        }
        let stack = mt
            .table
            .seat_of(player_id)
            .and_then(|i| mt.table.seat(i))
            .map(|s| s.stack)
            .unwrap_or_default();
        if !stack.is_zero() {
            return Err(PokerError::PlayerHasChips { player_id, stack });
        }
        self.release_seat(&mut mt.table, player_id)
    }

    /// Докупка: только при нулевом стеке и вне текущей раздачи.
    pub fn rebuy(&self, table_id: TableId, player_id: PlayerId, amount: Chips) -> Result<(), PokerError> {
        let mt = self.get(table_id)?;
        let mut guard = lock(&mt)?;
        let mt = &mut *guard;

        if mt.table.config.kind != TableKind::Cash {
            return Err(PokerError::RebuyNotAllowed(player_id));
        }
        let idx = mt.table.seat_of(player_id).ok_or(PokerError::PlayerNotAtTable { player_id, table_id })?;
        let stack = mt.table.seat(idx).map(|s| s.stack).unwrap_or_default();
        if !stack.is_zero() || player_in_hand(mt, player_id) {
            return Err(PokerError::RebuyNotAllowed(player_id));
        }
        if amount < mt.table.config.min_buy_in || amount > mt.table.config.max_buy_in {
            return Err(PokerError::Validation(format!("ребай {amount} вне диапазона бай-ина")));
        }

        let op = LedgerOp::new(
            format!("cash-rebuy:{table_id}:{player_id}:{}", self.ids.next_op_seq()),
            player_id,
            amount,
            LedgerReason::CashRebuy { table_id },
        );
        self.ledger.debit(&op)?;

        if let Some(seat) = mt.table.seat_mut(idx) {
            seat.stack = amount;
        }
        self.persist_table(&mt.table);
        Ok(())
    }

    /// Пропускать (или снова играть) следующие раздачи.
    pub fn sit_out(&self, table_id: TableId, player_id: PlayerId, sitting_out: bool) -> Result<(), PokerError> {
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        let idx = mt.table.seat_of(player_id).ok_or(PokerError::PlayerNotAtTable { player_id, table_id })?;
        if let Some(seat) = mt.table.seat_mut(idx) {
            seat.sitting_out = sitting_out;
        }
        self.persist_table(&mt.table);
        Ok(())
    }

    /// Пересадить игрока между столами (балансировка).
    /// Игрок не должен участвовать в текущей раздаче своего стола;
    /// на новом столе он садится на свободное место и ждёт следующей раздачи.
    pub fn transfer_player(&self, from: TableId, to: TableId, player_id: PlayerId) -> Result<SeatIndex, PokerError> {
        if from == to {
            return Err(PokerError::Validation("пересадка на тот же стол".into()));
        }
        let a = self.get(from)?;
        let b = self.get(to)?;

        // Замки всегда берём в порядке возрастания id.
        let (mut src, mut dst) = if from < to {
            let s = lock(&a)?;
            let d = lock(&b)?;
            (s, d)
        } else {
            let d = lock(&b)?;
            let s = lock(&a)?;
            (s, d)
        };

        if player_in_hand(&src, player_id) {
            return Err(PokerError::HandInProgress(from));
        }
        let seat_idx = dst.table.first_empty_seat().ok_or(PokerError::TableFull(to))?;

        let seat = self.release_seat(&mut src.table, player_id)?;
        self.claim_seat(&mut dst.table, seat_idx, player_id, seat.stack, seat.is_bot)?;

        info!(
            "{:<32}{}",
            "player moved",
            format!("player={player_id} from={from} to={to} seat={seat_idx} stack={}", seat.stack)
        );
        Ok(seat_idx)
    }

    /// Закрыть стол без активной раздачи. Кэш-столы возвращают стеки через леджер.
    pub fn close_table(&self, table_id: TableId) -> Result<Vec<(PlayerId, Chips)>, PokerError> {
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        if mt.hand.is_some() {
            return Err(PokerError::HandInProgress(table_id));
        }

        let mut released = Vec::new();
        for pid in mt.table.player_ids() {
            let seat = self.release_seat(&mut mt.table, pid)?;
            if mt.table.config.kind == TableKind::Cash && !seat.stack.is_zero() {
                let op = LedgerOp::new(
                    format!("cash-out:{table_id}:{pid}:close"),
                    pid,
                    seat.stack,
                    LedgerReason::CashOut { table_id },
                );
                self.ledger.credit(&op)?;
            }
            released.push((pid, seat.stack));
        }
        drop(mt);

        self.tables
            .write()
            .map_err(|_| PokerError::Internal("rwlock poisoned"))?
            .remove(&table_id);
        if let Err(e) = self.storage.delete_table(table_id) {
            warn!("{:<32}{}", "storage delete failed", format!("table={table_id} err={e}"));
        }
        info!("{:<32}{}", "table closed", format!("table={table_id} released={}", released.len()));
        Ok(released)
    }

    /// Обновить блайнды стола (турнир при смене уровня).
    pub fn set_stakes(&self, table_id: TableId, blinds: BlindLevel) -> Result<(), PokerError> {
        blinds.validate().map_err(PokerError::Validation)?;
        let mt = self.get(table_id)?;
        let mut mt = lock(&mt)?;
        mt.table.config.stakes = blinds;
        self.persist_table(&mt.table);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Раздачи
    // ------------------------------------------------------------------

    /// Запустить раздачу с блайндами стола.
    pub fn start_hand(&self, table_id: TableId, now: u64) -> Result<ActionReport, PokerError> {
        let mt = self.get(table_id)?;
        let mut guard = lock(&mt)?;
        let mt = &mut *guard;

        let blinds = mt.table.config.stakes.clone();
        let hand_id = self.ids.next_hand_id();
        let policy = self.config.odd_chip_policy;
        let started = match &self.hand_seed {
            Some(base) => {
                let hand_number = mt.table.hands_played + 1;
                let mut rng = base.for_hand(table_id, hand_id, hand_number).to_rng();
                debug!("table={} hand={} seeded deck, hand_number={}", table_id, hand_id, hand_number);
                game_loop::start_hand(&mut mt.table, &blinds, &mut rng, hand_id, now, policy)?
            }
            None => {
                let mut rng = lock(&self.rng)?;
                game_loop::start_hand(&mut mt.table, &blinds, &mut **rng, hand_id, now, policy)?
            }
        };

        self.persist_table(&mt.table);
        let completed = started.hand.is_complete();
        mt.hand = Some(started.hand);

        let outcome = ActionOutcome {
            events: started.events,
            street_changed: false,
            completed,
        };
        self.after_outcome(mt, outcome, now, 0)
    }

    /// Применить действие человека (или внешнего агента) и доиграть ботов.
    pub fn process_action(&self, table_id: TableId, action: PlayerAction, now: u64) -> Result<ActionReport, PokerError> {
        let mt = self.get(table_id)?;
        let mut guard = lock(&mt)?;
        let mt = &mut *guard;

        let hand = mt.hand.as_mut().ok_or(PokerError::NoActiveHand(table_id))?;
        let outcome = game_loop::process_action(hand, action, now)?;
        self.after_outcome(mt, outcome, now, 0)
    }

    /// Если ход просрочен, check (если можно) или fold за игрока.
    pub fn enforce_turn_timeout(&self, table_id: TableId, now: u64) -> Result<Option<ActionReport>, PokerError> {
        let mt = self.get(table_id)?;
        let mut guard = lock(&mt)?;
        let mt = &mut *guard;

        let Some(hand) = mt.hand.as_mut() else {
            return Ok(None);
        };
        if !game_loop::turn_expired(hand, now, self.config.turn_timeout_secs) {
            return Ok(None);
        }
        let Some(action) = game_loop::timeout_action(hand) else {
            return Ok(None);
        };

        info!(
            "{:<32}{}",
            "turn timeout",
            format!("table={table_id} player={} forced={}", action.player_id, action.kind)
        );
        let outcome = game_loop::process_action(hand, action, now)?;
        self.after_outcome(mt, outcome, now, 0).map(Some)
    }

    /// Общий хвост: события, сохранение, завершение раздачи, ходы ботов.
    fn after_outcome(
        &self,
        mt: &mut ManagedTable,
        mut outcome: ActionOutcome,
        now: u64,
        mut bot_actions: u32,
    ) -> Result<ActionReport, PokerError> {
        loop {
            for ev in outcome.events.drain(..) {
                self.events.publish(ev);
            }

            let hand = mt.hand.as_ref().ok_or(PokerError::NoActiveHand(mt.table.id))?;
            self.persist_hand(hand);

            if outcome.completed {
                return self.finish_hand(mt, bot_actions);
            }

            let Some(actor) = hand.acting_player() else {
                return Ok(report(mt, bot_actions, None));
            };
            if !actor.is_bot {
                return Ok(report(mt, bot_actions, None));
            }
            if bot_actions >= self.config.max_bot_actions_per_call {
                warn!(
                    "{:<32}{}",
                    "bot chain limit",
                    format!("table={} hand={} actions={bot_actions}", hand.table_id, hand.id)
                );
                return Ok(report(mt, bot_actions, None));
            }

            if self.config.bot_think_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.bot_think_delay_ms));
            }

            let valid = valid_actions(hand, actor.player_id)?;
            let action = {
                let mut rng = lock(&self.rng)?;
                bot::decide(hand, actor, &valid, &self.config.bot, &mut **rng)
            };

            let hand = mt.hand.as_mut().ok_or(PokerError::NoActiveHand(mt.table.id))?;
            outcome = game_loop::process_action(hand, action, now)?;
            bot_actions += 1;
        }
    }

    /// Записать стеки обратно в места, закрыть раздачу.
    fn finish_hand(&self, mt: &mut ManagedTable, bot_actions: u32) -> Result<ActionReport, PokerError> {
        let hand = mt.hand.take().ok_or(PokerError::NoActiveHand(mt.table.id))?;
        let table = &mut mt.table;

        let mut busted = Vec::new();
        for p in &hand.players {
            if let Some(seat) = table.seat_mut(p.seat) {
                if seat.player_id == p.player_id {
                    seat.stack = p.stack;
                    if p.stack.is_zero() {
                        busted.push((p.player_id, p.stack_start));
                    }
                }
            }
        }
        table.hands_played += 1;
        table.current_hand_id = None;
        self.persist_table(table);

        let completion = HandCompletion {
            table_id: table.id,
            hand_id: hand.id,
            awards: hand.awards.clone(),
            undistributed: hand.undistributed,
            busted,
        };
        mt.last_hand = Some(hand);
        Ok(report(mt, bot_actions, Some(completion)))
    }

    fn persist_table(&self, table: &Table) {
        if let Err(e) = self.storage.save_table(table) {
            warn!("{:<32}{}", "storage save failed", format!("table={} err={e}", table.id));
        }
    }

    fn persist_hand(&self, hand: &HandRound) {
        if let Err(e) = self.storage.save_hand(hand) {
            warn!("{:<32}{}", "storage save failed", format!("hand={} err={e}", hand.id));
        }
    }
}

/// Участвует ли игрок в раздаче (в том числе сбросив карты):
/// пока раздача идёт, его фишки учитываются в ней.
fn player_in_hand(mt: &ManagedTable, player_id: PlayerId) -> bool {
    mt.hand.as_ref().and_then(|h| h.player(player_id)).is_some()
}

fn report(mt: &ManagedTable, bot_actions: u32, completion: Option<HandCompletion>) -> ActionReport {
    let hand = mt.hand.as_ref().or(mt.last_hand.as_ref());
    ActionReport {
        table_id: mt.table.id,
        hand_id: hand.map(|h| h.id).unwrap_or_default(),
        status: hand.map(|h| h.status).unwrap_or(HandStatus::Complete),
        acting_player: mt.hand.as_ref().and_then(|h| h.acting_player()).map(|p| p.player_id),
        bot_actions,
        completion,
    }
}
