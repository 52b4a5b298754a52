//! Tower Flap headless runner
//!
//! Plays a few rounds with a simple autopilot and logs what happens.
//! Usage: `tower-flap [tuning.json] [seed] [save.json]`

use tower_flap::audio::AudioManager;
use tower_flap::leaderboard::LocalLeaderboard;
use tower_flap::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use tower_flap::sim::{Phase, Session};
use tower_flap::{Game, Tuning, ui};

const FRAME_DT: f32 = 1.0 / 60.0;
const RUN_SECONDS: f32 = 120.0;

fn main() {
    env_logger::init();
    log::info!("Tower Flap (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) if path != "-" => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        _ => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);
    let store: Box<dyn KeyValueStore> = match args.next() {
        Some(path) => match JsonFileStore::open(&path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Save file unusable ({}), keeping scores in memory", e);
                Box::new(MemoryStore::new())
            }
        },
        None => Box::new(MemoryStore::new()),
    };

    let mut game = Game::new(
        tuning,
        seed,
        store,
        Box::new(LocalLeaderboard::new()),
        AudioManager::default(),
    );
    log::info!("Seed {:#x}", game.session.seed);
    game.boot();
    game.assets_loaded();

    let mut rounds = 0u32;
    let mut last_phase = game.session.phase();
    let frames = (RUN_SECONDS / FRAME_DT) as u32;
    for _ in 0..frames {
        if should_activate(&game.session) {
            game.activate(None);
        }
        game.update(FRAME_DT);

        let phase = game.session.phase();
        if phase != last_phase {
            if phase == Phase::GameOver {
                rounds += 1;
                println!(
                    "round {}: {}",
                    rounds,
                    ui::hud_lines(&game.session, true).join(" | ")
                );
            }
            last_phase = phase;
        }
    }

    println!(
        "{} rounds, best score {}",
        rounds,
        game.session.high_score()
    );
}

/// Flap when below the next gap, restart rounds once allowed
fn should_activate(session: &Session) -> bool {
    match session.phase() {
        Phase::MainMenu => true,
        Phase::GameOver => session.time_in_phase_ms() > session.tuning.game_over_cooldown_ms as f64,
        Phase::Playing => {
            let player = &session.player;
            let target = next_gap_center(session)
                .unwrap_or(session.tuning.world.playable_bottom() / 2.0);
            player.pos.y > target + player.size.y / 2.0 && player.vel.y > 0.0
        }
        Phase::Boot | Phase::Preloading => false,
    }
}

fn next_gap_center(session: &Session) -> Option<f32> {
    let player_left = session.player.rect().min.x;
    let trigger = session
        .triggers
        .iter()
        .filter(|t| t.rect.max.x >= player_left)
        .min_by(|a, b| a.rect.min.x.total_cmp(&b.rect.min.x))?;

    let pair: Vec<_> = session
        .obstacles
        .iter()
        .filter(|o| o.pair_id == trigger.pair_id)
        .collect();
    let top = pair.iter().find(|o| o.flipped)?;
    let bottom = pair.iter().find(|o| !o.flipped)?;
    Some((top.rect.max.y + bottom.rect.min.y) / 2.0)
}
