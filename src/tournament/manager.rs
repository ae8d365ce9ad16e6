// src/tournament/manager.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::tournament::{Standing, Tournament, TournamentConfig, TournamentStatus};
use crate::domain::{Chips, PlayerId, TableId, TournamentId};
use crate::engine::actions::PlayerAction;
use crate::engine::errors::{ErrorKind, PokerError};
use crate::engine::events::EngineEvent;
use crate::engine::table_manager::{ActionReport, HandCompletion, TableManager};
use crate::engine::{shuffle_slice, RandomSource};
use crate::infra::ids::IdGenerator;
use crate::infra::ledger::{LedgerOp, LedgerReason};
use crate::tournament::rebalance::compute_rebalance_plan;

/// Что произошло за один проход турнирного цикла.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentProgress {
    pub hands_started: u32,
    pub hands_completed: u32,
    /// (игрок, место) в порядке вылета.
    pub eliminated: Vec<(PlayerId, u32)>,
    pub players_moved: u32,
    pub completed: bool,
}

/// Менеджер турниров (sit-n-go):
/// - регистрация с бай-инами через леджер;
/// - старт, рассадка по столам;
/// - обработка итогов раздач: вылеты, уровни блайндов, балансировка;
/// - раздача призов.
///
/// Турнир лежит под своим замком; столы турнира живут в `TableManager`.
/// Порядок замков: турнир, затем стол.
pub struct TournamentManager {
    tables: Arc<TableManager>,
    tournaments: RwLock<HashMap<TournamentId, Arc<Mutex<Tournament>>>>,
    ids: IdGenerator,
    rng: Mutex<Box<dyn RandomSource + Send>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, PokerError> {
    m.lock().map_err(|_| PokerError::Internal("mutex poisoned"))
}

impl TournamentManager {
    pub fn new(tables: Arc<TableManager>, rng: Box<dyn RandomSource + Send>) -> Self {
        Self {
            tables,
            tournaments: RwLock::new(HashMap::new()),
            ids: IdGenerator::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn tables(&self) -> &Arc<TableManager> {
        &self.tables
    }

    fn get(&self, id: TournamentId) -> Result<Arc<Mutex<Tournament>>, PokerError> {
        self.tournaments
            .read()
            .map_err(|_| PokerError::Internal("rwlock poisoned"))?
            .get(&id)
            .cloned()
            .ok_or(PokerError::TournamentNotFound(id))
    }

    pub fn tournament_ids(&self) -> Vec<TournamentId> {
        let mut ids: Vec<TournamentId> = self
            .tournaments
            .read()
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Снимок турнира.
    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, PokerError> {
        let t = self.get(id)?;
        let t = lock(&t)?;
        Ok(t.clone())
    }

    // ------------------------------------------------------------------
    // Регистрация
    // ------------------------------------------------------------------

    pub fn create_tournament(&self, config: TournamentConfig) -> Result<TournamentId, PokerError> {
        let id = self.ids.next_tournament_id();
        let tournament = Tournament::new(id, config)?;
        self.persist(&tournament);

        info!(
            "{:<32}{}",
            "tournament created",
            format!(
                "tournament={id} name={} buy_in={} players={}..={}",
                tournament.config.name,
                tournament.config.buy_in,
                tournament.config.min_players,
                tournament.config.max_players
            )
        );

        self.tournaments
            .write()
            .map_err(|_| PokerError::Internal("rwlock poisoned"))?
            .insert(id, Arc::new(Mutex::new(tournament)));
        Ok(id)
    }

    /// Регистрация: сначала бай-ин через леджер, потом запись в турнир.
    pub fn register(&self, tournament_id: TournamentId, player_id: PlayerId, is_bot: bool) -> Result<(), PokerError> {
        let t = self.get(tournament_id)?;
        let mut t = lock(&t)?;
        t.check_can_register(player_id)?;

        if !t.config.buy_in.is_zero() {
            let op = LedgerOp::new(
                format!("tourney-buyin:{tournament_id}:{player_id}:{}", self.ids.next_op_seq()),
                player_id,
                t.config.buy_in,
                LedgerReason::TournamentBuyIn { tournament_id },
            );
            self.tables.ledger().debit(&op)?;
        }

        t.register_player(player_id, is_bot)?;
        self.persist(&t);
        debug!(
            "{:<32}{}",
            "player registered",
            format!("tournament={tournament_id} player={player_id} pool={}", t.prize_pool)
        );
        Ok(())
    }

    pub fn unregister(&self, tournament_id: TournamentId, player_id: PlayerId) -> Result<(), PokerError> {
        let t = self.get(tournament_id)?;
        let mut t = lock(&t)?;
        t.check_can_unregister(player_id)?;

        self.refund(&t, player_id)?;
        t.unregister_player(player_id)?;
        self.persist(&t);
        debug!(
            "{:<32}{}",
            "player unregistered",
            format!("tournament={tournament_id} player={player_id} pool={}", t.prize_pool)
        );
        Ok(())
    }

    /// Отменить турнир до старта, вернув бай-ины.
    pub fn cancel(&self, tournament_id: TournamentId, now: u64) -> Result<(), PokerError> {
        let t = self.get(tournament_id)?;
        let mut t = lock(&t)?;
        t.ensure_status(TournamentStatus::Registration)?;

        let players: Vec<PlayerId> = t.registrations.keys().copied().collect();
        for &player_id in &players {
            self.refund(&t, player_id)?;
        }
        t.prize_pool = Chips::ZERO;
        t.status = TournamentStatus::Cancelled;
        t.completed_at = Some(now);
        self.persist(&t);

        info!(
            "{:<32}{}",
            "tournament cancelled",
            format!("tournament={tournament_id} refunds={}", players.len())
        );
        Ok(())
    }

    fn refund(&self, t: &Tournament, player_id: PlayerId) -> Result<(), PokerError> {
        if t.config.buy_in.is_zero() {
            return Ok(());
        }
        let op = LedgerOp::new(
            format!("tourney-refund:{}:{player_id}:{}", t.id, self.ids.next_op_seq()),
            player_id,
            t.config.buy_in,
            LedgerReason::TournamentRefund { tournament_id: t.id },
        );
        self.tables.ledger().credit(&op)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ход турнира
    // ------------------------------------------------------------------

    /// Старт: случайная рассадка по `ceil(n / table_size)` столам,
    /// уровень 0, первые раздачи на всех столах.
    pub fn start(&self, tournament_id: TournamentId, now: u64) -> Result<TournamentProgress, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        t.ensure_status(TournamentStatus::Registration)?;

        let n = t.registrations.len();
        if n < t.config.min_players as usize {
            return Err(PokerError::InsufficientPlayers {
                required: t.config.min_players as usize,
                available: n,
            });
        }

        let mut players: Vec<(PlayerId, bool)> = t.registrations.values().map(|r| (r.player_id, r.is_bot)).collect();
        {
            let mut rng = lock(&self.rng)?;
            shuffle_slice(&mut players, &mut **rng);
        }

        let table_size = t.config.table_size;
        let table_count = n.div_ceil(table_size as usize);
        let blinds = t.current_blinds()?.clone();

        let mut table_ids = Vec::with_capacity(table_count);
        for k in 0..table_count {
            let name = format!("{} #{}", t.config.name, k + 1);
            table_ids.push(self.tables.create_tournament_table(name, table_size, blinds.clone(), t.id)?);
        }

        for (i, (player_id, is_bot)) in players.into_iter().enumerate() {
            let table_id = table_ids[i % table_count];
            let seat = self
                .tables
                .seat_tournament_player(table_id, player_id, t.config.starting_stack, is_bot)?;
            if let Some(reg) = t.registrations.get_mut(&player_id) {
                reg.table_id = Some(table_id);
                reg.seat = Some(seat);
            }
        }

        t.table_ids = table_ids;
        t.status = TournamentStatus::Running;
        t.started_at = Some(now);
        t.current_level = 0;
        t.next_blind_increase_at =
            (t.config.blind_schedule.last_index() > 0).then(|| now + blinds.duration_secs);
        self.persist(t);

        info!(
            "{:<32}{}",
            "tournament started",
            format!(
                "tournament={tournament_id} players={n} tables={table_count} blinds={}/{}",
                blinds.small_blind, blinds.big_blind
            )
        );

        self.drive(t, Vec::new(), now)
    }

    /// Действие игрока за турнирным столом + обработка итогов раздачи.
    pub fn process_action(
        &self,
        tournament_id: TournamentId,
        table_id: TableId,
        action: PlayerAction,
        now: u64,
    ) -> Result<(ActionReport, TournamentProgress), PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        t.ensure_status(TournamentStatus::Running)?;
        ensure_table_of(t, table_id)?;

        let report = self.tables.process_action(table_id, action, now)?;
        let pending: Vec<HandCompletion> = report.completion.iter().cloned().collect();
        let progress = if pending.is_empty() {
            TournamentProgress::default()
        } else {
            self.drive(t, pending, now)?
        };
        Ok((report, progress))
    }

    /// Периодический вызов: таймауты ходов, уровни блайндов,
    /// запуск раздач на простаивающих столах.
    pub fn tick(&self, tournament_id: TournamentId, now: u64) -> Result<TournamentProgress, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        t.ensure_status(TournamentStatus::Running)?;

        let mut pending = Vec::new();
        for table_id in t.table_ids.clone() {
            if let Some(report) = self.tables.enforce_turn_timeout(table_id, now)? {
                pending.extend(report.completion);
            }
        }
        self.drive(t, pending, now)
    }

    /// Снять игрока с турнира. Место = число оставшихся до вылета.
    pub fn eliminate_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        now: u64,
    ) -> Result<u32, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        let place = self.eliminate(t, player_id)?;
        self.complete_if_done(t, now)?;
        Ok(place)
    }

    /// Если остался один игрок, раздать призы. `true`, если турнир завершён.
    pub fn check_complete(&self, tournament_id: TournamentId, now: u64) -> Result<bool, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        self.complete_if_done(&mut guard, now)
    }

    /// Повысить уровень блайндов, если пришло время.
    pub fn advance_blind_level(&self, tournament_id: TournamentId, now: u64) -> Result<Option<usize>, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        self.advance_level(&mut guard, now)
    }

    /// Раздать призы. Допустимо, когда в турнире остался один игрок.
    pub fn distribute_prizes(&self, tournament_id: TournamentId, now: u64) -> Result<Vec<Standing>, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        t.ensure_status(TournamentStatus::Running)?;
        if t.remaining_count() > 1 {
            return Err(PokerError::Validation(format!(
                "в турнире {tournament_id} ещё {} игроков",
                t.remaining_count()
            )));
        }
        self.pay_out(t, now)?;
        Ok(t.standings.clone())
    }

    /// Пересадить игроков между столами и закрыть пустые. Возвращает число пересадок.
    pub fn balance_tables(&self, tournament_id: TournamentId) -> Result<u32, PokerError> {
        let t = self.get(tournament_id)?;
        let mut guard = lock(&t)?;
        let t = &mut *guard;
        t.ensure_status(TournamentStatus::Running)?;
        self.rebalance(t)
    }

    // ------------------------------------------------------------------
    // Внутреннее
    // ------------------------------------------------------------------

    /// Турнирный цикл: итоги раздач, уровни, балансировка, новые раздачи.
    /// Раздачи ботов завершаются сразу, поэтому цикл крутится, пока есть
    /// завершённые раздачи, не больше `max_hands_per_drive` раздач за вызов.
    fn drive(
        &self,
        t: &mut Tournament,
        mut pending: Vec<HandCompletion>,
        now: u64,
    ) -> Result<TournamentProgress, PokerError> {
        let limit = self.tables.config().max_hands_per_drive;
        let mut progress = TournamentProgress::default();

        loop {
            for completion in pending.drain(..) {
                progress.hands_completed += 1;
                self.apply_completion(t, &completion, &mut progress)?;
            }

            if self.complete_if_done(t, now)? {
                progress.completed = true;
                break;
            }

            self.advance_level(t, now)?;
            progress.players_moved += self.rebalance(t)?;

            if progress.hands_started >= limit {
                warn!(
                    "{:<32}{}",
                    "drive limit reached",
                    format!("tournament={} hands={}", t.id, progress.hands_started)
                );
                break;
            }

            let reports = self.start_idle_tables(t, now, limit - progress.hands_started)?;
            if reports.is_empty() {
                break;
            }
            progress.hands_started += reports.len() as u32;
            pending = reports.into_iter().filter_map(|r| r.completion).collect();

            // Остальные раздачи ждут ходов людей.
            if pending.is_empty() {
                break;
            }
        }

        self.persist(t);
        Ok(progress)
    }

    /// Вылеты по итогам раздачи. Из вылетевших в одной раздаче
    /// выше место у того, кто начинал её с большим стеком.
    fn apply_completion(
        &self,
        t: &mut Tournament,
        completion: &HandCompletion,
        progress: &mut TournamentProgress,
    ) -> Result<(), PokerError> {
        let mut busted = completion.busted.clone();
        busted.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        for (player_id, _) in busted {
            let active = t.registrations.get(&player_id).map(|r| !r.eliminated).unwrap_or(false);
            if !active || t.remaining_count() <= 1 {
                continue;
            }
            let place = self.eliminate(t, player_id)?;
            progress.eliminated.push((player_id, place));
        }
        Ok(())
    }

    fn eliminate(&self, t: &mut Tournament, player_id: PlayerId) -> Result<u32, PokerError> {
        t.check_can_eliminate(player_id)?;

        if let Some(table_id) = t.registrations.get(&player_id).and_then(|r| r.table_id) {
            match self.tables.remove_busted_player(table_id, player_id) {
                Ok(_) | Err(PokerError::PlayerNotAtTable { .. }) | Err(PokerError::TableNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let place = t.mark_eliminated(player_id)?;
        self.persist(t);
        self.tables.events().publish(EngineEvent::PlayerEliminated {
            tournament_id: t.id,
            player_id,
            place,
        });
        info!(
            "{:<32}{}",
            "player eliminated",
            format!("tournament={} player={player_id} place={place}", t.id)
        );
        Ok(place)
    }

    fn complete_if_done(&self, t: &mut Tournament, now: u64) -> Result<bool, PokerError> {
        match t.status {
            TournamentStatus::Completed => Ok(true),
            TournamentStatus::Running if t.remaining_count() <= 1 => {
                self.pay_out(t, now)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn advance_level(&self, t: &mut Tournament, now: u64) -> Result<Option<usize>, PokerError> {
        let Some(level) = t.advance_level_if_due(now) else {
            return Ok(None);
        };
        let blinds = t.current_blinds()?.clone();

        // Текущие раздачи доигрываются со старыми блайндами.
        for &table_id in &t.table_ids {
            self.tables.set_stakes(table_id, blinds.clone())?;
        }
        self.persist(t);

        self.tables.events().publish(EngineEvent::BlindIncreased {
            tournament_id: t.id,
            level,
            blinds: blinds.clone(),
        });
        info!(
            "{:<32}{}",
            "blind level up",
            format!(
                "tournament={} level={level} blinds={}/{} ante={}",
                t.id, blinds.small_blind, blinds.big_blind, blinds.ante
            )
        );
        Ok(Some(level))
    }

    fn rebalance(&self, t: &mut Tournament) -> Result<u32, PokerError> {
        let mut dist = BTreeMap::new();
        for &table_id in &t.table_ids {
            dist.insert(table_id, self.tables.table(table_id)?.player_ids());
        }

        let plan = compute_rebalance_plan(&dist, t.config.table_size, t.config.max_seat_diff);
        let mut moved = 0;
        for mv in &plan.moves {
            match self.tables.transfer_player(mv.from_table, mv.to_table, mv.player_id) {
                Ok(seat) => {
                    if let Some(reg) = t.registrations.get_mut(&mv.player_id) {
                        reg.table_id = Some(mv.to_table);
                        reg.seat = Some(seat);
                    }
                    moved += 1;
                }
                // Игрок в раздаче или стол занят: повторим после следующей раздачи.
                Err(e) if e.kind() == ErrorKind::ResourceConflict => {
                    debug!(
                        "{:<32}{}",
                        "move deferred",
                        format!("player={} from={} to={} reason={e}", mv.player_id, mv.from_table, mv.to_table)
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let mut closed = Vec::new();
        for &table_id in &t.table_ids {
            let table = self.tables.table(table_id)?;
            if table.player_ids().is_empty() && !table.hand_in_progress() {
                self.tables.close_table(table_id)?;
                closed.push(table_id);
            }
        }
        t.table_ids.retain(|id| !closed.contains(id));

        if moved > 0 || !closed.is_empty() {
            self.persist(t);
            info!(
                "{:<32}{}",
                "tables balanced",
                format!("tournament={} moved={moved} closed={closed:?} tables={}", t.id, t.table_ids.len())
            );
        }
        Ok(moved)
    }

    fn start_idle_tables(&self, t: &Tournament, now: u64, budget: u32) -> Result<Vec<ActionReport>, PokerError> {
        let mut reports = Vec::new();
        for &table_id in &t.table_ids {
            if reports.len() as u32 >= budget {
                break;
            }
            let table = self.tables.table(table_id)?;
            if table.hand_in_progress() || table.active_count() < 2 {
                continue;
            }
            match self.tables.start_hand(table_id, now) {
                Ok(report) => reports.push(report),
                Err(e) if e.kind() == ErrorKind::InsufficientPlayers => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(reports)
    }

    /// Места: выживший первый, дальше от последнего вылетевшего к первому.
    /// Ключи леджера зависят только от турнира и места, повтор безопасен.
    fn pay_out(&self, t: &mut Tournament, now: u64) -> Result<(), PokerError> {
        let pool = t.prize_pool;
        let mut standings = Vec::with_capacity(t.registrations.len());

        for (i, player_id) in t.finishing_order().into_iter().enumerate() {
            let place = i as u32 + 1;
            let prize = t.config.prizes.prize_for_place(place, pool);
            if !prize.is_zero() {
                let op = LedgerOp::new(
                    format!("tourney-prize:{}:{place}", t.id),
                    player_id,
                    prize,
                    LedgerReason::TournamentPrize {
                        tournament_id: t.id,
                        place,
                    },
                );
                self.tables.ledger().credit(&op)?;
            }
            standings.push(Standing { place, player_id, prize });
        }

        for table_id in std::mem::take(&mut t.table_ids) {
            if let Err(e) = self.tables.close_table(table_id) {
                warn!("{:<32}{}", "table close failed", format!("table={table_id} err={e}"));
            }
        }

        if let Some(winner) = standings.first() {
            if let Some(reg) = t.registrations.get_mut(&winner.player_id) {
                reg.finishing_place = Some(1);
                reg.table_id = None;
                reg.seat = None;
            }
        }

        t.standings = standings;
        t.status = TournamentStatus::Completed;
        t.completed_at = Some(now);
        t.next_blind_increase_at = None;
        self.persist(t);

        self.tables.events().publish(EngineEvent::TournamentComplete {
            tournament_id: t.id,
            standings: t.standings.clone(),
        });
        let winner = t.standings.first().map(|s| (s.player_id, s.prize));
        info!(
            "{:<32}{}",
            "tournament complete",
            format!("tournament={} pool={pool} winner={winner:?}", t.id)
        );
        Ok(())
    }

    fn persist(&self, t: &Tournament) {
        if let Err(e) = self.tables.storage().save_tournament(t) {
            warn!("{:<32}{}", "storage save failed", format!("tournament={} err={e}", t.id));
        }
    }
}

fn ensure_table_of(t: &Tournament, table_id: TableId) -> Result<(), PokerError> {
    if t.table_ids.contains(&table_id) {
        Ok(())
    } else {
        Err(PokerError::Validation(format!(
            "стол {table_id} не принадлежит турниру {}",
            t.id
        )))
    }
}
