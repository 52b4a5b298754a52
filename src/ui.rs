//! Clickable UI rectangles and HUD text
//!
//! Raw pointer coordinates are only ever tested against a short list of
//! buttons. Anything that misses every button is a player activation.

use glam::Vec2;

use crate::sim::{Phase, Rect, Session};
use crate::tuning::WorldTuning;

/// What a button does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ToggleSound,
    SubmitScore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    pub rect: Rect,
    pub action: UiAction,
    /// Phases in which the button is visible and clickable
    pub visible_in: &'static [Phase],
}

impl Button {
    pub fn is_active(&self, phase: Phase) -> bool {
        self.visible_in.contains(&phase)
    }
}

/// How a single activate input was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Button(UiAction),
    Player,
}

/// Default button layout: sound toggle in the top-right corner (menu and
/// game over), leaderboard submit centered low on the game-over screen
pub fn default_buttons(world: &WorldTuning) -> Vec<Button> {
    let toggle_size = Vec2::new(48.0, 48.0);
    let submit_size = Vec2::new(160.0, 48.0);
    vec![
        Button {
            rect: Rect::from_pos_size(
                Vec2::new(world.width - toggle_size.x - 8.0, 8.0),
                toggle_size,
            ),
            action: UiAction::ToggleSound,
            visible_in: &[Phase::MainMenu, Phase::GameOver],
        },
        Button {
            rect: Rect::from_center_size(
                Vec2::new(world.width / 2.0, world.height * 0.75),
                submit_size,
            ),
            action: UiAction::SubmitScore,
            visible_in: &[Phase::GameOver],
        },
    ]
}

/// Resolve an activate input against the visible buttons
pub fn route_activation(pointer: Option<Vec2>, phase: Phase, buttons: &[Button]) -> Activation {
    let Some(point) = pointer else {
        return Activation::Player;
    };
    buttons
        .iter()
        .filter(|b| b.is_active(phase))
        .find(|b| b.rect.contains_point(point))
        .map(|b| Activation::Button(b.action))
        .unwrap_or(Activation::Player)
}

/// Text lines for the HUD in the current phase
pub fn hud_lines(session: &Session, show_high_score: bool) -> Vec<String> {
    let mut lines = Vec::new();
    match session.phase() {
        Phase::Boot | Phase::Preloading => lines.push("Loading...".to_string()),
        Phase::MainMenu => lines.push("Tap to start".to_string()),
        Phase::Playing => lines.push(session.score().to_string()),
        Phase::GameOver => {
            lines.push("Game over".to_string());
            lines.push(format!("Score: {}", session.score()));
        }
    }
    if show_high_score && !matches!(session.phase(), Phase::Boot | Phase::Preloading) {
        lines.push(format!("Best: {}", session.high_score()));
    }
    lines
}
