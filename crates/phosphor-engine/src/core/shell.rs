use crate::api::game::{ChannelConfig, GameHooks, ShellCtx};
use crate::api::types::SoundEvent;
use crate::core::bus::{BusMessage, EventBus};
use crate::core::store::{HauntSnapshot, SharedStateStore};
use crate::core::timer::TimerSet;
use crate::input::pad::{Pad, CONFIRM};
use crate::renderer::frame::FrameBuffer;
use crate::systems::bleed::{self, BleedOverlay};
use crate::systems::glitch::Rng;
use crate::systems::hud::{self, FontConfig};

/// The lifecycle phases. An instance occupies exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Title,
    Running,
    Paused,
    GameOver,
}

/// Per-instance lifecycle bookkeeping, owned by the shell and handed to
/// hooks through `ShellCtx`. The phase itself is private: hooks steer it
/// only through the sanctioned paths (`die()` and the confirm button).
pub struct ShellState {
    pub config: ChannelConfig,
    phase: Phase,
    /// Sticky for the session: once a title screen is dismissed, later
    /// activations skip straight to Running.
    title_dismissed: bool,
    /// Whether this instance is the active channel (between start/stop).
    active: bool,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Elapsed time on this channel, accumulated while active.
    pub play_time_ms: f64,
    /// Frame-local copy of the haunting signals, refreshed at frame start.
    pub haunt: HauntSnapshot,
    sounds: Vec<SoundEvent>,
    bleed: Option<BleedOverlay>,
    death_hook_pending: bool,
}

impl ShellState {
    pub fn new(config: ChannelConfig) -> Self {
        let lives = config.starting_lives;
        Self {
            config,
            phase: Phase::Title,
            title_dismissed: false,
            active: false,
            score: 0,
            lives,
            level: 1,
            play_time_ms: 0.0,
            haunt: HauntSnapshot::default(),
            sounds: Vec::new(),
            bleed: None,
            death_hook_pending: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn showing_title(&self) -> bool {
        self.phase == Phase::Title
    }

    pub fn paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn title_dismissed(&self) -> bool {
        self.title_dismissed
    }

    /// Queue a named sound cue for the host to play.
    pub fn play_sound(&mut self, sound: SoundEvent) {
        self.sounds.push(sound);
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    /// The one sanctioned path toward game over.
    ///
    /// Decrements the life counter. With lives remaining the run continues:
    /// a damage cue plays and the instance's death hook runs at the end of
    /// the current update pass. At zero the death cue plays and the phase
    /// becomes GameOver, freezing gameplay updates.
    ///
    /// Calling this outside the Running phase is a logged no-op — lives
    /// are never decremented twice for one game over.
    pub fn die(&mut self) {
        if !self.active || self.phase != Phase::Running {
            log::warn!("{}: die() outside Running ignored", self.config.id);
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.play_sound(SoundEvent::DEATH);
            self.phase = Phase::GameOver;
            log::info!("{}: game over at score {}", self.config.id, self.score);
        } else {
            self.play_sound(SoundEvent::DAMAGE);
            self.death_hook_pending = true;
        }
    }

    /// Accept a bleed overlay posted by another channel. At most one is
    /// held; a newcomer replaces the previous overlay.
    pub fn receive_bleed(&mut self, overlay: BleedOverlay) {
        self.bleed = Some(overlay);
    }

    pub fn bleed(&self) -> Option<&BleedOverlay> {
        self.bleed.as_ref()
    }

    fn tick_bleed(&mut self, dt_ms: f32) {
        bleed::tick(&mut self.bleed, dt_ms);
    }

    fn take_death_hook(&mut self) -> bool {
        std::mem::take(&mut self.death_hook_pending)
    }

    /// Back to fresh-run defaults. Phase is left to the caller.
    fn reset_run(&mut self) {
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.level = 1;
        self.play_time_ms = 0.0;
        self.death_hook_pending = false;
    }
}

/// The per-game lifecycle controller.
///
/// Owns one game and drives its state machine: title → running →
/// paused/game-over → restart. The game and its bookkeeping live in
/// sibling fields so hooks can borrow them disjointly.
pub struct GameShell<G: GameHooks> {
    game: G,
    state: ShellState,
    timers: TimerSet<G>,
    font: FontConfig,
    fx_rng: Rng,
    initialized: bool,
}

impl<G: GameHooks> GameShell<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let fx_rng = Rng::new(0x48_41_55_4e_54 ^ (config.channel as u64 + 1));
        Self {
            game,
            state: ShellState::new(config),
            timers: TimerSet::new(),
            font: FontConfig::default(),
            fx_rng,
            initialized: false,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Make this instance the active channel.
    ///
    /// Runs `on_init` on the first activation only, resets the transient
    /// lifecycle flags, takes a fresh haunt snapshot, and re-enters either
    /// Title or (when the title was already dismissed this session)
    /// Running. An instance left at game over comes back as a fresh run.
    pub fn start(&mut self, pad: &Pad, store: &SharedStateStore, bus: &mut EventBus) {
        self.state.active = true;
        self.state.haunt = store.snapshot();

        if !self.initialized {
            self.initialized = true;
            let mut ctx = ShellCtx {
                pad,
                state: &mut self.state,
                timers: &mut self.timers,
                bus,
            };
            self.game.on_init(&mut ctx);
        }

        if self.state.lives == 0 {
            self.state.reset_run();
            let mut ctx = ShellCtx {
                pad,
                state: &mut self.state,
                timers: &mut self.timers,
                bus,
            };
            self.game.on_restart(&mut ctx);
        }

        self.state.phase = if self.state.title_dismissed {
            Phase::Running
        } else {
            Phase::Title
        };

        let mut ctx = ShellCtx {
            pad,
            state: &mut self.state,
            timers: &mut self.timers,
            bus,
        };
        self.game.on_start(&mut ctx);
        log::info!(
            "{}: started on channel {} ({:?})",
            self.state.config.id,
            self.state.config.channel,
            self.state.phase
        );
    }

    /// The instance lost focus. Cancels every pending timer and tears
    /// down this channel's bus subscriptions, so nothing fires against a
    /// stopped game.
    pub fn stop(&mut self, pad: &Pad, bus: &mut EventBus) {
        if !self.state.active {
            return;
        }
        let mut ctx = ShellCtx {
            pad,
            state: &mut self.state,
            timers: &mut self.timers,
            bus,
        };
        self.game.on_stop(&mut ctx);
        self.state.active = false;
        self.timers.clear();
        bus.unsubscribe_channel(self.state.config.channel);
        log::info!("{}: stopped", self.state.config.id);
    }

    /// Per-frame entry point, called by the host once per animation frame.
    /// No-op unless this instance is the active channel.
    pub fn render(
        &mut self,
        frame: &mut FrameBuffer,
        pad: &Pad,
        store: &SharedStateStore,
        bus: &mut EventBus,
        dt_ms: f32,
        ts_ms: f64,
    ) {
        if !self.state.active {
            return;
        }

        self.state.play_time_ms += dt_ms as f64;
        self.state.haunt = store.snapshot();
        let channel = self.state.config.channel;

        match self.state.phase {
            Phase::Title => {
                self.game.render_title(frame, &self.state);
                if pad.just_pressed(CONFIRM) {
                    self.state.title_dismissed = true;
                    self.state.phase = Phase::Running;
                    let mut ctx = ShellCtx {
                        pad,
                        state: &mut self.state,
                        timers: &mut self.timers,
                        bus,
                    };
                    self.game.on_title_dismiss(&mut ctx);
                    log::info!("{}: title dismissed", self.state.config.id);
                }
            }

            Phase::GameOver => {
                self.game.render_game_over(frame, &self.state);
                if pad.just_pressed(CONFIRM) {
                    self.state.reset_run();
                    self.state.phase = Phase::Running;
                    let mut ctx = ShellCtx {
                        pad,
                        state: &mut self.state,
                        timers: &mut self.timers,
                        bus,
                    };
                    self.game.on_restart(&mut ctx);
                    log::info!("{}: fresh run", self.state.config.id);
                }
            }

            Phase::Paused => {
                if pad.just_pressed(CONFIRM) {
                    self.state.phase = Phase::Running;
                    self.state.play_sound(SoundEvent::PAUSE);
                    bus.publish(BusMessage::Resume { channel });
                    self.game.on_render(frame, &self.state, dt_ms, ts_ms);
                    hud::compose_hud(frame, &self.state, &self.font, &mut self.fx_rng);
                } else {
                    self.game.on_render(frame, &self.state, dt_ms, ts_ms);
                    hud::draw_pause_overlay(frame, &self.state.config, &self.font);
                }
            }

            Phase::Running => {
                // The confirm edge pauses before gameplay sees any input:
                // one press never both pauses and acts.
                if pad.just_pressed(CONFIRM) {
                    self.state.phase = Phase::Paused;
                    self.state.play_sound(SoundEvent::PAUSE);
                    bus.publish(BusMessage::Pause { channel });
                    self.game.on_render(frame, &self.state, dt_ms, ts_ms);
                    hud::draw_pause_overlay(frame, &self.state.config, &self.font);
                    return;
                }

                {
                    let mut ctx = ShellCtx {
                        pad,
                        state: &mut self.state,
                        timers: &mut self.timers,
                        bus,
                    };
                    self.game.on_update(&mut ctx, dt_ms, ts_ms);
                }
                self.timers.tick(dt_ms, &mut self.game, &mut self.state);

                if self.state.take_death_hook() {
                    let mut ctx = ShellCtx {
                        pad,
                        state: &mut self.state,
                        timers: &mut self.timers,
                        bus,
                    };
                    self.game.on_death(&mut ctx);
                }

                self.game.on_render(frame, &self.state, dt_ms, ts_ms);
                hud::compose_hud(frame, &self.state, &self.font, &mut self.fx_rng);

                self.state.tick_bleed(dt_ms);
                if let Some(overlay) = self.state.bleed() {
                    bleed::render(frame, overlay, &self.font);
                }
            }
        }
    }

    /// Hand a routed bus message to the game.
    pub fn deliver(&mut self, message: &BusMessage, pad: &Pad, bus: &mut EventBus) {
        if !self.state.active {
            return;
        }
        let mut ctx = ShellCtx {
            pad,
            state: &mut self.state,
            timers: &mut self.timers,
            bus,
        };
        self.game.on_message(message, &mut ctx);
    }
}

/// Object-safe face of a shell, so a host can hold a mixed channel lineup.
pub trait Channel {
    fn id(&self) -> &str;
    fn channel_no(&self) -> u32;
    fn start(&mut self, pad: &Pad, store: &SharedStateStore, bus: &mut EventBus);
    fn stop(&mut self, pad: &Pad, bus: &mut EventBus);
    fn render(
        &mut self,
        frame: &mut FrameBuffer,
        pad: &Pad,
        store: &SharedStateStore,
        bus: &mut EventBus,
        dt_ms: f32,
        ts_ms: f64,
    );
    fn deliver(&mut self, message: &BusMessage, pad: &Pad, bus: &mut EventBus);
    fn receive_bleed(&mut self, overlay: BleedOverlay);
    fn drain_sounds(&mut self) -> Vec<SoundEvent>;
    fn shell_state(&self) -> &ShellState;
}

impl<G: GameHooks> Channel for GameShell<G> {
    fn id(&self) -> &str {
        &self.state.config.id
    }

    fn channel_no(&self) -> u32 {
        self.state.config.channel
    }

    fn start(&mut self, pad: &Pad, store: &SharedStateStore, bus: &mut EventBus) {
        GameShell::start(self, pad, store, bus);
    }

    fn stop(&mut self, pad: &Pad, bus: &mut EventBus) {
        GameShell::stop(self, pad, bus);
    }

    fn render(
        &mut self,
        frame: &mut FrameBuffer,
        pad: &Pad,
        store: &SharedStateStore,
        bus: &mut EventBus,
        dt_ms: f32,
        ts_ms: f64,
    ) {
        GameShell::render(self, frame, pad, store, bus, dt_ms, ts_ms);
    }

    fn deliver(&mut self, message: &BusMessage, pad: &Pad, bus: &mut EventBus) {
        GameShell::deliver(self, message, pad, bus);
    }

    fn receive_bleed(&mut self, overlay: BleedOverlay) {
        self.state.receive_bleed(overlay);
    }

    fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        self.state.drain_sounds()
    }

    fn shell_state(&self) -> &ShellState {
        &self.state
    }
}
