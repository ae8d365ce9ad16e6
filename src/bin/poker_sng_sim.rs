// src/bin/poker_sng_sim.rs
//
// Симулятор sit-n-go: N ботов, один турнир до победителя.
//
//   poker_sng_sim [игроков] [сид] [engine.toml]

use std::sync::Arc;

use holdem_engine::config::EngineConfig;
use holdem_engine::domain::blinds::BlindSchedule;
use holdem_engine::domain::chips::Chips;
use holdem_engine::domain::tournament::{PrizeStructure, TournamentConfig, TournamentStatus};
use holdem_engine::domain::PlayerId;
use holdem_engine::engine::{MemorySink, TableManager};
use holdem_engine::infra::{DeterministicRng, InMemoryLedger, InMemoryPokerStorage, RngSeed};
use holdem_engine::tournament::TournamentManager;

const BUY_IN: u64 = 100;
/// Сколько «секунд» проходит между проходами турнирного цикла.
const TICK_SECS: u64 = 60;
const MAX_TICKS: u64 = 10_000;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let players: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(18);
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    let mut config = match args.get(3) {
        Some(path) => match EngineConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("[SNG] {e}");
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };
    // Один проход цикла ≈ один «тик» часов.
    config.max_hands_per_drive = config.max_hands_per_drive.min(50);

    println!("poker_sng_sim: {players} ботов, сид {seed}");

    let ledger = Arc::new(InMemoryLedger::new());
    let events = Arc::new(MemorySink::new());
    let storage = Arc::new(InMemoryPokerStorage::new());

    let tables = Arc::new(TableManager::new(
        config,
        Box::new(RngSeed::from_u64(seed).to_rng()),
        ledger.clone(),
        events.clone(),
        storage.clone(),
    )
    .with_hand_seed(RngSeed::from_u64(seed)));
    let manager = TournamentManager::new(tables, Box::new(DeterministicRng::from_u64(seed ^ 0x5eed)));

    let cfg = TournamentConfig {
        name: "Bot SNG".to_string(),
        buy_in: Chips(BUY_IN),
        starting_stack: Chips(1_500),
        min_players: 2,
        max_players: players.max(2),
        table_size: 9,
        blind_schedule: BlindSchedule::standard_sng(),
        prizes: PrizeStructure { percents: vec![50, 30, 20] },
        max_seat_diff: 1,
    };

    let tournament_id = match manager.create_tournament(cfg) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("[SNG] create_tournament: {e}");
            std::process::exit(1);
        }
    };

    for pid in 1..=players as PlayerId {
        ledger.deposit(pid, Chips(BUY_IN));
        if let Err(e) = manager.register(tournament_id, pid, true) {
            eprintln!("[SNG] register {pid}: {e}");
        }
    }

    let mut now = 0;
    let mut hands = 0;
    match manager.start(tournament_id, now) {
        Ok(p) => hands += p.hands_started,
        Err(e) => {
            eprintln!("[SNG] start: {e}");
            std::process::exit(1);
        }
    }

    for _ in 0..MAX_TICKS {
        let Ok(t) = manager.tournament(tournament_id) else {
            break;
        };
        if t.status != TournamentStatus::Running {
            break;
        }
        now += TICK_SECS;
        match manager.tick(tournament_id, now) {
            Ok(p) => hands += p.hands_started,
            Err(e) => {
                eprintln!("[SNG] tick: {e}");
                break;
            }
        }
    }

    let Ok(t) = manager.tournament(tournament_id) else {
        std::process::exit(1);
    };

    println!(
        "Турнир {} ({:?}): раздач {hands}, уровень {}, пул {}",
        t.id, t.status, t.current_level, t.prize_pool
    );
    for s in &t.standings {
        println!("  {:>3}. игрок {:>4}  приз {}", s.place, s.player_id, s.prize);
    }
    println!(
        "Событий: {}, сохранено раздач: {}",
        events.len(),
        storage.hand_count()
    );
}
