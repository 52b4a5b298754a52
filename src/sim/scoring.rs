//! Scoring director
//!
//! A trigger is consumed the first time the player crosses it. Duplicate or
//! late overlap reports for a consumed trigger are dropped.

use super::session::Session;
use super::state::{GameEvent, Sound};

/// Consume `trigger_id` and award one point. Returns false if the trigger is
/// already gone (consumed, swept, or cleared by a reset).
pub fn on_overlap(session: &mut Session, trigger_id: u32) -> bool {
    let Some(index) = session.triggers.iter().position(|t| t.id == trigger_id) else {
        log::trace!("Trigger {} already consumed", trigger_id);
        return false;
    };
    session.triggers.remove(index);
    session.score += 1;

    let score = session.score;
    log::debug!("Scored through trigger {} -> {}", trigger_id, score);
    session.emit(GameEvent::ScoreChanged { score });
    session.emit(GameEvent::PlaySound(Sound::Score));
    true
}
