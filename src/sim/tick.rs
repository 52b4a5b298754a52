//! Fixed timestep simulation tick
//!
//! Stage order is fixed: input, motion, scoring overlaps, obstacle overlaps,
//! bounds, off-screen sweep, spawn timer, cloud timer, presentation. Scoring
//! always resolves before the sweep can remove a trigger.

use super::pose::advance_ground;
use super::session::Session;
use super::spawner::sweep_offscreen;
use super::state::{BodyKind, Phase, SessionEvent};
use crate::persistence::KeyValueStore;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Activate (tap/click/key) not claimed by a UI button
    pub activate: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32, store: &mut dyn KeyValueStore) {
    if input.activate {
        session.handle(SessionEvent::PlayerActivated, store);
    }

    session.advance_clock(dt);

    if matches!(session.phase(), Phase::Boot | Phase::Preloading) {
        return;
    }

    integrate(session, dt);

    if session.phase() == Phase::Playing {
        resolve_overlaps(session, store);
    }
    if session.phase() == Phase::GameOver {
        rest_on_ground(session);
    }

    let left_bound = 0.0;
    sweep_offscreen(
        &mut session.obstacles,
        &mut session.triggers,
        &mut session.clouds,
        left_bound,
    );

    if session.spawn_timer().is_due(session.clock_ms()) {
        session.handle(SessionEvent::TimerElapsed, store);
    }
    session.spawn_cloud_if_due();

    let flap_velocity = session.tuning.player.flap_velocity;
    let vel_y = session.player.vel.y;
    let phase = session.phase();
    session.pose.update(phase, vel_y, flap_velocity, dt);
    if phase != Phase::GameOver {
        session.ground_offset =
            advance_ground(session.ground_offset, session.tuning.difficulty.base_speed, dt);
    }

    session.normalize_order();
}

fn integrate(session: &mut Session, dt: f32) {
    let gravity = session.tuning.player.gravity;
    session.player.integrate(gravity, dt);

    for obstacle in &mut session.obstacles {
        obstacle.rect.translate(obstacle.vel * dt);
    }
    for trigger in &mut session.triggers {
        trigger.rect.translate(trigger.vel * dt);
    }
    for cloud in &mut session.clouds {
        cloud.pos += cloud.vel * dt;
    }
}

/// Report player overlaps to the state machine, triggers first
fn resolve_overlaps(session: &mut Session, store: &mut dyn KeyValueStore) {
    let player = session.player.rect();

    let crossed: Vec<u32> = session
        .triggers
        .iter()
        .filter(|t| t.rect.overlaps(&player))
        .map(|t| t.id)
        .collect();
    for id in crossed {
        session.handle(
            SessionEvent::OverlapDetected {
                with: BodyKind::ScoreTrigger { id },
            },
            store,
        );
    }

    let hit = session
        .obstacles
        .iter()
        .find(|o| o.rect.overlaps(&player))
        .map(|o| o.id);
    if let Some(id) = hit {
        session.handle(
            SessionEvent::OverlapDetected {
                with: BodyKind::Obstacle { id },
            },
            store,
        );
        return;
    }

    let margin = session.tuning.player.out_of_bounds_margin;
    let bottom = session.tuning.world.playable_bottom();
    if player.min.y < -margin || player.max.y > bottom + margin {
        session.handle(SessionEvent::PlayerOutOfBounds, store);
    }
}

/// After a crash the body falls and settles on the fence
fn rest_on_ground(session: &mut Session) {
    let bottom = session.tuning.world.playable_bottom();
    let half_height = session.player.size.y / 2.0;
    if session.player.pos.y + half_height > bottom {
        session.player.pos.y = bottom - half_height;
        session.player.vel = glam::Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::persistence::MemoryStore;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn menu(seed: u64) -> (Session, MemoryStore) {
        menu_with(Tuning::default(), seed)
    }

    fn menu_with(tuning: Tuning, seed: u64) -> (Session, MemoryStore) {
        let mut store = MemoryStore::new();
        let mut session = Session::new(tuning, seed);
        session.handle(SessionEvent::Boot, &mut store);
        session.handle(SessionEvent::AssetsLoaded, &mut store);
        session.drain_events();
        (session, store)
    }

    fn activate() -> TickInput {
        TickInput { activate: true }
    }

    #[test]
    fn test_menu_to_playing_on_input() {
        let (mut session, mut store) = menu(1);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::MainMenu);

        tick(&mut session, &activate(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert!(session.spawn_timer().is_active());
    }

    #[test]
    fn test_falling_out_of_bounds_ends_round() {
        let (mut session, mut store) = menu(2);
        store.set(crate::highscores::HIGHSCORE_KEY, "4").unwrap();
        tick(&mut session, &activate(), SIM_DT, &mut store);

        // Drop the player below the fence
        session.player.pos.y = session.tuning.world.height + 100.0;
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);

        assert_eq!(session.phase(), Phase::GameOver);
        assert!(!session.spawn_timer().is_active());
        assert!(session.obstacles.iter().all(|o| o.vel == Vec2::ZERO));
        assert_eq!(session.high_score(), 4);
        assert_eq!(crate::highscores::load_high_score(&store).unwrap(), 4);
    }

    /// Start a round and pin the player so only its placement matters
    fn hover_at(session: &mut Session, store: &mut MemoryStore, top: f32) {
        tick(session, &activate(), SIM_DT, store);
        session.player.gravity_enabled = false;
        session.player.vel = Vec2::ZERO;
        session.player.pos.y = top + session.player.size.y / 2.0;
    }

    #[test]
    fn test_leaving_through_ceiling_ends_round() {
        let (mut session, mut store) = menu(7);
        hover_at(&mut session, &mut store, -1.0);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn test_out_of_bounds_margin() {
        let mut tuning = Tuning::default();
        tuning.player.out_of_bounds_margin = 30.0;

        // Poking 10px above the ceiling is inside the slack
        let (mut session, mut store) = menu_with(tuning.clone(), 8);
        hover_at(&mut session, &mut store, -10.0);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::Playing);

        let (mut session, mut store) = menu_with(tuning.clone(), 8);
        hover_at(&mut session, &mut store, -40.0);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::GameOver);

        // Same slack below the fence
        let bottom = tuning.world.playable_bottom();
        let height = tuning.player.size.y;
        let (mut session, mut store) = menu_with(tuning.clone(), 8);
        hover_at(&mut session, &mut store, bottom - height + 20.0);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::Playing);

        let (mut session, mut store) = menu_with(tuning, 8);
        hover_at(&mut session, &mut store, bottom - height + 40.0);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn test_timer_spawns_over_time() {
        let (mut session, mut store) = menu(3);
        tick(&mut session, &activate(), SIM_DT, &mut store);

        let mut spawned = false;
        for _ in 0..(2.0 / SIM_DT) as usize {
            // Hold the player in the middle of the gap line
            session.player.pos.y = session.tuning.world.height / 2.0;
            session.player.vel = Vec2::ZERO;
            tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
            if !session.obstacles.is_empty() {
                spawned = true;
                break;
            }
        }
        assert!(spawned);
        assert_eq!(session.triggers.len(), 1);
        assert!(session.obstacles.iter().all(|o| o.vel.x < 0.0));
    }

    #[test]
    fn test_crossing_trigger_scores() {
        let (mut session, mut store) = menu(4);
        tick(&mut session, &activate(), SIM_DT, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        session.player.gravity_enabled = false;

        // Park the player just left of the trigger line
        let trigger_x = session.triggers[0].rect.min.x;
        session.obstacles.clear();
        let mid = session.tuning.world.playable_bottom() / 2.0;
        session.player.pos = Vec2::new(trigger_x - session.player.size.x, mid);
        session.player.vel = Vec2::ZERO;

        for _ in 0..120 {
            tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
            if session.score() > 0 {
                break;
            }
        }
        assert_eq!(session.score(), 1);
        assert!(session.triggers.is_empty());
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_game_over_freezes_and_settles() {
        let (mut session, mut store) = menu(5);
        tick(&mut session, &activate(), SIM_DT, &mut store);
        session.handle(SessionEvent::TimerElapsed, &mut store);
        let before: Vec<f32> = session.obstacles.iter().map(|o| o.rect.min.x).collect();

        session.handle(SessionEvent::PlayerOutOfBounds, &mut store);
        for _ in 0..600 {
            tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        }
        let after: Vec<f32> = session.obstacles.iter().map(|o| o.rect.min.x).collect();
        assert_eq!(before, after);
        assert!(session.player.rect().max.y <= session.tuning.world.playable_bottom() + 1e-3);
        assert!(session.obstacles.len() == 2, "no spawns after game over");
    }

    #[test]
    fn test_clouds_spawn_and_drift() {
        let (mut session, mut store) = menu(6);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert_eq!(session.clouds.len(), 1);
        let x = session.clouds[0].pos.x;
        tick(&mut session, &TickInput::default(), SIM_DT, &mut store);
        assert!(session.clouds[0].pos.x < x);
    }

    #[test]
    fn test_determinism() {
        let run = |seed: u64| {
            let (mut session, mut store) = menu(seed);
            tick(&mut session, &activate(), SIM_DT, &mut store);
            for i in 0..600 {
                let input = TickInput {
                    activate: i % 30 == 0,
                };
                tick(&mut session, &input, SIM_DT, &mut store);
            }
            (
                session.phase(),
                session.score(),
                session.player.pos,
                session.obstacles.iter().map(|o| o.rect).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(99), run(99));
    }
}
