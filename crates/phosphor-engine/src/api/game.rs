use serde::{Deserialize, Serialize};

use crate::api::types::Rgba;
use crate::core::bus::{BusMessage, EventBus};
use crate::core::shell::ShellState;
use crate::core::timer::TimerSet;
use crate::input::pad::Pad;
use crate::renderer::frame::FrameBuffer;
use crate::systems::hud::{self, FontConfig};

/// Construction-time configuration for one game, immutable thereafter.
/// Hosts can load a whole channel lineup from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Stable identifier (used in logs and save keys).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Logical channel number on the surrounding "TV".
    pub channel: u32,
    /// Logical canvas width in game units.
    pub width: f32,
    /// Logical canvas height in game units.
    pub height: f32,
    /// Title-screen headline.
    pub title_text: String,
    /// Title-screen headline color.
    pub title_color: Rgba,
    /// Title-screen backdrop fill.
    pub backdrop: Rgba,
    /// Lives at the start of a fresh run.
    pub starting_lives: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: "untitled".to_string(),
            name: "Untitled".to_string(),
            channel: 0,
            width: 256.0,
            height: 224.0,
            title_text: "UNTITLED".to_string(),
            title_color: Rgba::WHITE,
            backdrop: Rgba::BLACK,
            starting_lives: 3,
        }
    }
}

impl ChannelConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, channel: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            channel,
            ..Default::default()
        }
    }

    // -- Builder pattern --

    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, text: impl Into<String>, color: Rgba) -> Self {
        self.title_text = text.into();
        self.title_color = color;
        self
    }

    pub fn with_backdrop(mut self, backdrop: Rgba) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn with_starting_lives(mut self, lives: u32) -> Self {
        self.starting_lives = lives;
        self
    }
}

/// Mutable access to an instance's lifecycle machinery, passed to hooks.
/// Borrows are disjoint from the game itself, so hooks can freely mutate
/// their own fields alongside shell bookkeeping.
pub struct ShellCtx<'a, G> {
    /// Frame-stable input state. Edges do not change mid-frame.
    pub pad: &'a Pad,
    /// Lifecycle bookkeeping: score, lives, haunt snapshot, sounds.
    pub state: &'a mut ShellState,
    /// This instance's deferred-work timers.
    pub timers: &'a mut TimerSet<G>,
    /// Session event bus, for publishing and subscribing.
    pub bus: &'a mut EventBus,
}

/// The contract every game fulfills. Every hook is optional: the shell
/// supplies sensible no-op (or stock-presentation) defaults, and the
/// lifecycle machine never depends on a game overriding anything.
pub trait GameHooks: Sized {
    /// Return the instance configuration. Called once at construction.
    fn config(&self) -> ChannelConfig;

    /// One-time setup when the game first becomes visible — structures
    /// that depend on final canvas dimensions belong here.
    fn on_init(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// The game became the active channel.
    fn on_start(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// The game lost focus. Timers are cleared right after this returns.
    fn on_stop(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// Per-frame gameplay tick. Only runs in the Running phase.
    fn on_update(&mut self, _ctx: &mut ShellCtx<Self>, _dt_ms: f32, _ts_ms: f64) {}

    /// Per-frame gameplay draw. Read-only: append to the frame buffer.
    fn on_render(&self, _frame: &mut FrameBuffer, _state: &ShellState, _dt_ms: f32, _ts_ms: f64) {}

    /// A fresh run is starting after game over.
    fn on_restart(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// A life was lost but the run continues — respawn placement etc.
    fn on_death(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// The title screen was dismissed (typically an audio trigger).
    fn on_title_dismiss(&mut self, _ctx: &mut ShellCtx<Self>) {}

    /// A bus message on a topic this instance subscribed to.
    fn on_message(&mut self, _message: &BusMessage, _ctx: &mut ShellCtx<Self>) {}

    /// Title-screen presentation. The stock version draws the configured
    /// backdrop, headline and prompt.
    fn render_title(&self, frame: &mut FrameBuffer, state: &ShellState) {
        hud::draw_title(frame, &state.config, &FontConfig::default());
    }

    /// Game-over presentation. The stock version shows the final score.
    fn render_game_over(&self, frame: &mut FrameBuffer, state: &ShellState) {
        hud::draw_game_over(frame, state, &FontConfig::default());
    }
}
