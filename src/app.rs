//! Fixed-timestep driver
//!
//! Owns a session plus its collaborators (store, audio, leaderboard) and
//! runs whole frames: accumulate real time, step the simulation at `SIM_DT`,
//! then route the queued `GameEvent`s to whoever cares.

use glam::Vec2;

use crate::audio::AudioManager;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::leaderboard::{LeaderboardPanel, LeaderboardService};
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, Phase, Session, SessionEvent, TickInput, tick};
use crate::tuning::Tuning;
use crate::ui::{Activation, Button, UiAction, default_buttons, route_activation};

/// Game instance holding all state
pub struct Game {
    pub session: Session,
    pub settings: Settings,
    pub audio: AudioManager,
    pub leaderboard: LeaderboardPanel,
    store: Box<dyn KeyValueStore>,
    service: Box<dyn LeaderboardService>,
    buttons: Vec<Button>,
    accumulator: f32,
    input: TickInput,
    /// Score at the last HUD refresh
    shown_score: u32,
    /// This round's score already made it to the leaderboard
    score_posted: bool,
}

impl Game {
    pub fn new(
        tuning: Tuning,
        seed: u64,
        store: Box<dyn KeyValueStore>,
        service: Box<dyn LeaderboardService>,
        mut audio: AudioManager,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        audio.apply_settings(&settings);
        let buttons = default_buttons(&tuning.world);
        let leaderboard = LeaderboardPanel::new(tuning.leaderboard.clone());
        Self {
            session: Session::new(tuning, seed),
            settings,
            audio,
            leaderboard,
            store,
            service,
            buttons,
            accumulator: 0.0,
            input: TickInput::default(),
            shown_score: 0,
            score_posted: false,
        }
    }

    /// Kick off the boot sequence. Assets are loaded by the host, which
    /// then calls `assets_loaded`.
    pub fn boot(&mut self) {
        self.session.handle(SessionEvent::Boot, self.store.as_mut());
        self.flush_events();
    }

    pub fn assets_loaded(&mut self) {
        self.session.handle(SessionEvent::AssetsLoaded, self.store.as_mut());
        self.flush_events();
    }

    /// Discrete activate input, with pointer position when it came from a
    /// mouse or touch
    pub fn activate(&mut self, pointer: Option<Vec2>) {
        match route_activation(pointer, self.session.phase(), &self.buttons) {
            Activation::Button(action) => self.press(action),
            Activation::Player => self.input.activate = true,
        }
    }

    fn press(&mut self, action: UiAction) {
        match action {
            UiAction::ToggleSound => {
                let enabled = self.settings.toggle_sound();
                self.audio.set_muted(!enabled);
                if let Err(e) = self.settings.save(self.store.as_mut()) {
                    log::warn!("Could not save settings: {}", e);
                }
            }
            UiAction::SubmitScore => {
                if self.session.phase() != Phase::GameOver {
                    return;
                }
                if self.score_posted {
                    log::debug!("Score for this round already posted");
                    return;
                }
                let name = self.settings.player_name.clone();
                let Some(request) = self.leaderboard.request_submit(&name, self.session.score())
                else {
                    return;
                };
                // A failed post stays on screen until the player tries again
                if !self.leaderboard.dispatch(request, self.service.as_mut()) {
                    return;
                }
                self.score_posted = true;
                if let Some(request) = self.leaderboard.request_fetch() {
                    self.leaderboard.dispatch(request, self.service.as_mut());
                }
            }
        }
    }

    /// Run simulation ticks for `dt` seconds of real time
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.session, &input, SIM_DT, self.store.as_mut());
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.activate = false;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.flush_events();
    }

    fn flush_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::PlaySound(sound) => self.audio.play(sound),
                GameEvent::ScoreChanged { score } => self.shown_score = score,
                GameEvent::NewHighScore { score } => log::info!("New best: {}", score),
                GameEvent::PhaseChanged { from, to } => {
                    log::debug!("{:?} -> {:?}", from, to);
                    if to == Phase::MainMenu {
                        self.score_posted = false;
                    }
                }
                GameEvent::LoadAssets | GameEvent::PairSpawned { .. } => {}
            }
        }
    }

    /// Score as last reported to the HUD
    pub fn shown_score(&self) -> u32 {
        self.shown_score
    }
}
