//! Session state machine
//!
//! Owns the phase, the score, the spawn timer and every live body. The host
//! feeds it `SessionEvent`s (directly or via `tick`) and drains `GameEvent`s.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clouds::{next_cloud_interval_ms, spawn_cloud};
use super::difficulty::DifficultyState;
use super::pose::BirdPose;
use super::scoring;
use super::spawner::{next_interval_ms, spawn_pair};
use super::state::{
    BodyKind, Cloud, EntityIds, GameEvent, Obstacle, Phase, Player, ScoreTrigger, SessionEvent,
    Sound, SpawnTimer,
};
use crate::highscores::{load_high_score, record_high_score};
use crate::persistence::KeyValueStore;
use crate::tuning::Tuning;

/// Full mutable context of one game session (many rounds)
#[derive(Debug, Clone)]
pub struct Session {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(super) rng: Pcg32,
    phase: Phase,
    pub(super) score: u32,
    high_score: u32,
    /// Simulated time since boot
    clock_ms: f64,
    phase_entered_ms: f64,
    pub player: Player,
    /// Live obstacles (sorted by id)
    pub obstacles: Vec<Obstacle>,
    /// Unconsumed score triggers (sorted by id)
    pub triggers: Vec<ScoreTrigger>,
    pub clouds: Vec<Cloud>,
    pub(super) spawn_timer: SpawnTimer,
    pub(super) cloud_timer: SpawnTimer,
    pub pose: BirdPose,
    /// Fence tile scroll offset
    pub ground_offset: f32,
    pub(super) ids: EntityIds,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let player = Player::new(&tuning);
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Boot,
            score: 0,
            high_score: 0,
            clock_ms: 0.0,
            phase_entered_ms: 0.0,
            player,
            obstacles: Vec::new(),
            triggers: Vec::new(),
            clouds: Vec::new(),
            spawn_timer: SpawnTimer::default(),
            cloud_timer: SpawnTimer::default(),
            pose: BirdPose::default(),
            ground_offset: 0.0,
            ids: EntityIds::default(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn spawn_timer(&self) -> &SpawnTimer {
        &self.spawn_timer
    }

    /// Milliseconds spent in the current phase
    pub fn time_in_phase_ms(&self) -> f64 {
        self.clock_ms - self.phase_entered_ms
    }

    pub fn advance_clock(&mut self, dt: f32) {
        self.clock_ms += dt as f64 * 1000.0;
    }

    /// Take all notifications queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Dispatch one event. Returns false when the current phase ignores it.
    pub fn handle(&mut self, event: SessionEvent, store: &mut dyn KeyValueStore) -> bool {
        match (self.phase, event) {
            (Phase::Boot, SessionEvent::Boot) => {
                self.transition(Phase::Preloading);
                self.emit(GameEvent::LoadAssets);
            }
            (Phase::Preloading, SessionEvent::AssetsLoaded) => {
                self.restore_high_score(store);
                if self.tuning.clouds.enabled {
                    self.cloud_timer.start(self.clock_ms, 0.0);
                }
                self.enter_main_menu();
            }
            (Phase::MainMenu, SessionEvent::PlayerActivated) => self.start_round(),
            (Phase::Playing, SessionEvent::PlayerActivated) => {
                self.player.flap(self.tuning.player.flap_velocity);
                self.emit(GameEvent::PlaySound(Sound::Flap));
            }
            (Phase::Playing, SessionEvent::OverlapDetected { with }) => match with {
                BodyKind::ScoreTrigger { id } => return scoring::on_overlap(self, id),
                BodyKind::Obstacle { id } => {
                    if !self.obstacles.iter().any(|o| o.id == id) {
                        log::trace!("Overlap with removed obstacle {} ignored", id);
                        return false;
                    }
                    self.enter_game_over(store);
                }
            },
            (Phase::Playing, SessionEvent::PlayerOutOfBounds) => {
                self.enter_game_over(store);
            }
            (Phase::Playing, SessionEvent::TimerElapsed) => self.spawn_next_pair(),
            (Phase::GameOver, SessionEvent::PlayerActivated) => {
                if self.time_in_phase_ms() < self.tuning.game_over_cooldown_ms as f64 {
                    return false;
                }
                self.enter_main_menu();
            }
            (phase, event) => {
                log::trace!("{:?} ignored in {:?}", event, phase);
                return false;
            }
        }
        true
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        log::info!("Phase {:?} -> {:?} (score {})", from, to, self.score);
        self.phase = to;
        self.phase_entered_ms = self.clock_ms;
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    fn restore_high_score(&mut self, store: &dyn KeyValueStore) {
        match load_high_score(store) {
            Ok(stored) => self.high_score = self.high_score.max(stored),
            Err(e) => log::warn!("Could not read high score: {}", e),
        }
    }

    fn reset_score(&mut self) {
        if self.score != 0 {
            self.score = 0;
            self.emit(GameEvent::ScoreChanged { score: 0 });
        }
    }

    fn clear_round(&mut self) {
        self.obstacles.clear();
        self.triggers.clear();
    }

    fn enter_main_menu(&mut self) {
        self.transition(Phase::MainMenu);
        self.spawn_timer.stop();
        self.reset_score();
        self.clear_round();
        self.player.reset(&self.tuning);
        self.pose.reset();
    }

    fn start_round(&mut self) {
        self.reset_score();
        self.clear_round();
        self.player.reset(&self.tuning);
        self.player.gravity_enabled = true;

        let speed = DifficultyState::for_score(0, &self.tuning.difficulty).speed;
        let interval = next_interval_ms(&self.tuning.spawn.interval, speed, &mut self.rng);
        self.spawn_timer.start(self.clock_ms, interval);
        self.transition(Phase::Playing);
    }

    /// Round-ending effects. Safe to call repeatedly: the second call
    /// changes nothing unless the score moved in between. Ignored outside
    /// a round; returns false in that case.
    pub fn enter_game_over(&mut self, store: &mut dyn KeyValueStore) -> bool {
        if !matches!(self.phase, Phase::Playing | Phase::GameOver) {
            log::trace!("Game over ignored in {:?}", self.phase);
            return false;
        }
        if self.phase != Phase::GameOver {
            self.transition(Phase::GameOver);
            self.emit(GameEvent::PlaySound(Sound::Hurt));
        }

        for obstacle in &mut self.obstacles {
            obstacle.vel = glam::Vec2::ZERO;
        }
        for trigger in &mut self.triggers {
            trigger.vel = glam::Vec2::ZERO;
        }
        self.spawn_timer.stop();
        self.player.vel.x = 0.0;

        self.high_score = self.high_score.max(self.score);
        match record_high_score(store, self.score) {
            Ok(record) => {
                self.high_score = self.high_score.max(record.best(self.score));
                if record.saved {
                    self.emit(GameEvent::NewHighScore { score: self.score });
                }
            }
            Err(e) => log::warn!("Could not save high score: {}", e),
        }
        true
    }

    fn spawn_next_pair(&mut self) {
        let difficulty = DifficultyState::for_score(self.score, &self.tuning.difficulty);
        let pair = spawn_pair(&difficulty, &self.tuning, &mut self.rng, &mut self.ids);
        log::debug!(
            "Spawned pair {} (gap {:.1}, speed {:.1})",
            pair.trigger.pair_id,
            difficulty.gap,
            difficulty.speed
        );
        self.emit(GameEvent::PairSpawned {
            pair_id: pair.trigger.pair_id,
            gap: difficulty.gap,
            speed: difficulty.speed,
        });
        self.obstacles.push(pair.bottom);
        self.obstacles.push(pair.top);
        self.triggers.push(pair.trigger);

        let interval = next_interval_ms(&self.tuning.spawn.interval, difficulty.speed, &mut self.rng);
        self.spawn_timer.reschedule(self.clock_ms, interval);
    }

    /// Fire the cloud timer if due
    pub(super) fn spawn_cloud_if_due(&mut self) {
        if !self.cloud_timer.is_due(self.clock_ms) {
            return;
        }
        let cloud = spawn_cloud(&self.tuning, &mut self.rng, &mut self.ids);
        self.clouds.push(cloud);
        let interval = next_cloud_interval_ms(&self.tuning, &mut self.rng);
        self.cloud_timer.reschedule(self.clock_ms, interval);
    }

    /// Keep entity iteration order stable
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.triggers.sort_by_key(|t| t.id);
        self.clouds.sort_by_key(|c| c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn menu_session(store: &mut MemoryStore) -> Session {
        let mut session = Session::new(Tuning::default(), 7);
        assert!(session.handle(SessionEvent::Boot, store));
        assert!(session.handle(SessionEvent::AssetsLoaded, store));
        session.drain_events();
        session
    }

    #[test]
    fn test_boot_sequence() {
        let mut store = MemoryStore::new();
        let mut session = Session::new(Tuning::default(), 1);
        assert_eq!(session.phase(), Phase::Boot);

        // Input before the menu is a no-op
        assert!(!session.handle(SessionEvent::PlayerActivated, &mut store));
        assert_eq!(session.phase(), Phase::Boot);

        session.handle(SessionEvent::Boot, &mut store);
        assert_eq!(session.phase(), Phase::Preloading);
        assert!(session.drain_events().contains(&GameEvent::LoadAssets));

        assert!(!session.handle(SessionEvent::PlayerActivated, &mut store));
        session.handle(SessionEvent::AssetsLoaded, &mut store);
        assert_eq!(session.phase(), Phase::MainMenu);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_start_round() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        assert!(!session.spawn_timer().is_active());
        assert!(!session.player.gravity_enabled);

        session.handle(SessionEvent::PlayerActivated, &mut store);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert!(session.spawn_timer().is_active());
        assert!(session.player.gravity_enabled);
    }

    #[test]
    fn test_flap_plays_sound() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.drain_events();

        session.handle(SessionEvent::PlayerActivated, &mut store);
        assert!(session.player.vel.y < 0.0);
        assert_eq!(session.drain_events(), vec![GameEvent::PlaySound(Sound::Flap)]);
    }

    #[test]
    fn test_timer_spawns_pair_and_reschedules() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        let first = session.spawn_timer().next_fire_ms().unwrap();

        session.advance_clock(2.0);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        assert_eq!(session.obstacles.len(), 2);
        assert_eq!(session.triggers.len(), 1);
        assert!(session.spawn_timer().next_fire_ms().unwrap() > first);
    }

    #[test]
    fn test_out_of_bounds_ends_round() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        session.drain_events();

        session.handle(SessionEvent::PlayerOutOfBounds, &mut store);
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(!session.spawn_timer().is_active());
        assert!(session.obstacles.iter().all(|o| o.vel == glam::Vec2::ZERO));
        assert!(session.triggers.iter().all(|t| t.vel == glam::Vec2::ZERO));
        assert_eq!(session.high_score(), 0);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::PlaySound(Sound::Hurt))
        );
    }

    #[test]
    fn test_overlap_with_unknown_obstacle_ignored() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);

        let handled = session.handle(
            SessionEvent::OverlapDetected {
                with: BodyKind::Obstacle { id: 9999 },
            },
            &mut store,
        );
        assert!(!handled);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_obstacle_overlap_ends_round() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        let id = session.obstacles[0].id;

        session.handle(
            SessionEvent::OverlapDetected {
                with: BodyKind::Obstacle { id },
            },
            &mut store,
        );
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn test_game_over_cooldown() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::PlayerOutOfBounds, &mut store);

        // The tap that crashed must not restart immediately
        assert!(!session.handle(SessionEvent::PlayerActivated, &mut store));
        assert_eq!(session.phase(), Phase::GameOver);

        session.advance_clock(session.tuning.game_over_cooldown_ms / 1000.0 + 0.01);
        assert!(session.handle(SessionEvent::PlayerActivated, &mut store));
        assert_eq!(session.phase(), Phase::MainMenu);
        assert!(session.obstacles.is_empty());
        assert!(session.triggers.is_empty());
        assert!(!session.spawn_timer().is_active());
    }

    #[test]
    fn test_game_over_idempotent() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        let trigger = session.triggers[0].id;
        scoring::on_overlap(&mut session, trigger);

        session.enter_game_over(&mut store);
        assert_eq!(session.high_score(), 1);
        session.drain_events();

        session.enter_game_over(&mut store);
        assert_eq!(session.high_score(), 1);
        assert!(session.drain_events().is_empty());
        assert_eq!(load_high_score(&store).unwrap(), 1);
    }

    #[test]
    fn test_game_over_outside_round_ignored() {
        let mut store = MemoryStore::new();
        let mut session = Session::new(Tuning::default(), 3);
        assert!(!session.enter_game_over(&mut store));
        assert_eq!(session.phase(), Phase::Boot);

        let mut session = menu_session(&mut store);
        assert!(!session.enter_game_over(&mut store));
        assert_eq!(session.phase(), Phase::MainMenu);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_game_over_picks_up_stored_best() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        // Written by someone else after the menu read it
        store.set(crate::highscores::HIGHSCORE_KEY, "4").unwrap();
        assert_eq!(session.high_score(), 0);

        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::PlayerOutOfBounds, &mut store);
        assert_eq!(session.high_score(), 4);
        assert_eq!(load_high_score(&store).unwrap(), 4);
        assert!(
            !session
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::NewHighScore { .. }))
        );
    }

    #[test]
    fn test_high_score_survives_restart() {
        let mut store = MemoryStore::new();
        store.set(crate::highscores::HIGHSCORE_KEY, "2").unwrap();
        {
            let mut session = menu_session(&mut store);
            assert_eq!(session.high_score(), 2);
            session.handle(SessionEvent::PlayerActivated, &mut store);
            for _ in 0..5 {
                session.handle(SessionEvent::TimerElapsed, &mut store);
            }
            let ids: Vec<u32> = session.triggers.iter().map(|t| t.id).collect();
            for id in ids {
                session.handle(
                    SessionEvent::OverlapDetected {
                        with: BodyKind::ScoreTrigger { id },
                    },
                    &mut store,
                );
            }
            assert_eq!(session.score(), 5);
            session.handle(SessionEvent::PlayerOutOfBounds, &mut store);
            assert!(
                session
                    .drain_events()
                    .contains(&GameEvent::NewHighScore { score: 5 })
            );
        }

        let restarted = menu_session(&mut store);
        assert_eq!(restarted.high_score(), 5);
        assert_eq!(load_high_score(&store).unwrap(), 5);
    }

    #[test]
    fn test_menu_resets_score() {
        let mut store = MemoryStore::new();
        let mut session = menu_session(&mut store);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        let trigger = session.triggers[0].id;
        session.handle(
            SessionEvent::OverlapDetected {
                with: BodyKind::ScoreTrigger { id: trigger },
            },
            &mut store,
        );
        assert_eq!(session.score(), 1);

        session.handle(SessionEvent::PlayerOutOfBounds, &mut store);
        session.advance_clock(5.0);
        session.handle(SessionEvent::PlayerActivated, &mut store);
        assert_eq!(session.phase(), Phase::MainMenu);
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 1);
    }
}
