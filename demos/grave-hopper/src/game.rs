use glam::Vec2;
use phosphor_engine::{
    BleedOverlay, BusMessage, Buttons, ChannelConfig, FrameBuffer, GameHooks, Rgba, ShellCtx,
    ShellState, SoundEvent, Topic,
};
use phosphor_engine::renderer::frame::DrawInstance;
use phosphor_engine::systems::hud::{self, FontConfig};

const CHANNEL_NO: u32 = 13;
/// Channel that receives our bleed-through once the haunting escalates.
const STATIC_CHANNEL: u32 = 0;

const WORLD_W: f32 = 256.0;
const WORLD_H: f32 = 224.0;
const GROUND_Y: f32 = 180.0;
const PLAYER_X: f32 = 48.0;
const PLAYER_SIZE: f32 = 14.0;

/// Pixels per ms² / per ms.
const GRAVITY: f32 = 0.004;
const JUMP_VY: f32 = -1.1;
const BASE_STONE_SPEED: f32 = 0.08;
const SPEED_PER_LEVEL: f32 = 0.012;

const SPAWN_MS: f32 = 1400.0;
const BANNER_MS: f32 = 2000.0;
const RESPAWN_GAP: f32 = 60.0;
const POINTS_PER_STONE: u32 = 10;

struct Gravestone {
    x: f32,
    w: f32,
    h: f32,
    scored: bool,
}

/// Hop over the oncoming gravestones. One button, escalating speed,
/// and the graveyard starts whispering once the session corrupts.
pub struct GraveHopper {
    player: Vec2,
    vel_y: f32,
    stones: Vec<Gravestone>,
    spawn_counter: u32,
    banner: Option<String>,
}

impl GraveHopper {
    pub fn new() -> Self {
        Self {
            player: Vec2::new(PLAYER_X, GROUND_Y),
            vel_y: 0.0,
            stones: Vec::new(),
            spawn_counter: 0,
            banner: None,
        }
    }

    fn reset_field(&mut self) {
        self.player = Vec2::new(PLAYER_X, GROUND_Y);
        self.vel_y = 0.0;
        self.stones.clear();
        self.banner = None;
    }

    /// Stone dimensions cycle deterministically with the spawn counter.
    fn spawn_stone(&mut self) {
        let n = self.spawn_counter;
        self.spawn_counter += 1;
        self.stones.push(Gravestone {
            x: WORLD_W + 8.0,
            w: 10.0 + (n % 3) as f32 * 4.0,
            h: 16.0 + (n % 4) as f32 * 6.0,
            scored: false,
        });
    }

    fn grounded(&self) -> bool {
        self.player.y >= GROUND_Y
    }

    fn player_hits(&self, stone: &Gravestone) -> bool {
        let px0 = self.player.x - PLAYER_SIZE / 2.0;
        let px1 = self.player.x + PLAYER_SIZE / 2.0;
        let py0 = self.player.y - PLAYER_SIZE;
        let sx0 = stone.x;
        let sx1 = stone.x + stone.w;
        let sy0 = GROUND_Y - stone.h;
        px1 > sx0 && px0 < sx1 && self.player.y > sy0 && py0 < GROUND_Y
    }

    /// March stones left, score the ones that cleared the player, drop
    /// the ones that left the screen. Returns whether one hit the player.
    fn advance_stones(&mut self, state: &mut ShellState, dt_ms: f32) -> bool {
        let speed = BASE_STONE_SPEED + state.level as f32 * SPEED_PER_LEVEL;
        let mut hit = false;
        for stone in self.stones.iter_mut() {
            stone.x -= speed * dt_ms;
            if !stone.scored && stone.x + stone.w < PLAYER_X - PLAYER_SIZE / 2.0 {
                stone.scored = true;
                state.score += POINTS_PER_STONE;
            }
        }
        for stone in &self.stones {
            if self.player_hits(stone) {
                hit = true;
                break;
            }
        }
        self.stones.retain(|s| s.x + s.w > -8.0);
        hit
    }
}

impl Default for GraveHopper {
    fn default() -> Self {
        Self::new()
    }
}

impl GameHooks for GraveHopper {
    fn config(&self) -> ChannelConfig {
        ChannelConfig::new("grave-hopper", "Grave Hopper", CHANNEL_NO)
            .with_canvas(WORLD_W, WORLD_H)
            .with_title("GRAVE HOPPER", Rgba::PHOSPHOR)
            .with_backdrop(Rgba::new(0.02, 0.04, 0.03, 1.0))
    }

    fn on_start(&mut self, ctx: &mut ShellCtx<Self>) {
        self.reset_field();
        ctx.bus.subscribe(CHANNEL_NO, Topic::Narrative);
        ctx.timers
            .add(SPAWN_MS, true, |game, _, _| game.spawn_stone());
    }

    fn on_update(&mut self, ctx: &mut ShellCtx<Self>, dt_ms: f32, _ts_ms: f64) {
        if ctx.pad.just_pressed(Buttons::A) && self.grounded() {
            self.vel_y = JUMP_VY;
            ctx.state.play_sound(SoundEvent("hop"));
        }

        self.vel_y += GRAVITY * dt_ms;
        self.player.y = (self.player.y + self.vel_y * dt_ms).min(GROUND_Y);
        if self.grounded() {
            self.vel_y = self.vel_y.min(0.0);
        }

        let before = ctx.state.score;
        if self.advance_stones(ctx.state, dt_ms) {
            ctx.state.die();
            return;
        }

        ctx.state.level = 1 + ctx.state.score / 100;
        if before < 100 && ctx.state.score >= 100 {
            ctx.bus.publish(BusMessage::Narrative {
                cue: "THE GROUND REMEMBERS".to_string(),
            });
        }
        if before < 200 && ctx.state.score >= 200 && ctx.state.haunt.haunt_stage >= 1 {
            ctx.bus.publish(BusMessage::Bleed {
                target: STATIC_CHANNEL,
                overlay: BleedOverlay::new("HOP", 40.0, 60.0).with_color(Rgba::PHOSPHOR),
            });
        }
    }

    fn on_render(&self, frame: &mut FrameBuffer, state: &ShellState, _dt_ms: f32, _ts_ms: f64) {
        frame.push(DrawInstance::rect(0.0, 0.0, WORLD_W, WORLD_H, state.config.backdrop));
        frame.push(DrawInstance::rect(
            0.0,
            GROUND_Y,
            WORLD_W,
            WORLD_H - GROUND_Y,
            Rgba::new(0.1, 0.12, 0.1, 1.0),
        ));

        // Stones flush with the ground; they redden as corruption climbs.
        let haunted = state.haunt.corruption > 0.5;
        for stone in &self.stones {
            let color = if haunted {
                Rgba::BLOOD.with_alpha(0.7 + 0.3 * (state.play_time_ms / 90.0).sin().abs() as f32)
            } else {
                Rgba::new(0.55, 0.55, 0.6, 1.0)
            };
            frame.push(DrawInstance::rect(
                stone.x,
                GROUND_Y - stone.h,
                stone.w,
                stone.h,
                color,
            ));
        }

        frame.push(DrawInstance::rect(
            self.player.x - PLAYER_SIZE / 2.0,
            self.player.y - PLAYER_SIZE,
            PLAYER_SIZE,
            PLAYER_SIZE,
            Rgba::PHOSPHOR,
        ));

        if let Some(banner) = &self.banner {
            hud::draw_text_centered(
                frame,
                &FontConfig::default(),
                banner,
                WORLD_W / 2.0,
                40.0,
                10.0,
                Rgba::BLOOD,
            );
        }
    }

    fn on_death(&mut self, _ctx: &mut ShellCtx<Self>) {
        // Respawn with breathing room: nothing lands on the player's head.
        self.stones.retain(|s| s.x > PLAYER_X + RESPAWN_GAP);
        self.player.y = GROUND_Y;
        self.vel_y = 0.0;
    }

    fn on_restart(&mut self, _ctx: &mut ShellCtx<Self>) {
        self.reset_field();
    }

    fn on_title_dismiss(&mut self, ctx: &mut ShellCtx<Self>) {
        ctx.state.play_sound(SoundEvent::CONFIRM);
    }

    fn on_message(&mut self, message: &BusMessage, ctx: &mut ShellCtx<Self>) {
        if let BusMessage::Narrative { cue } = message {
            self.banner = Some(cue.clone());
            ctx.timers.add(BANNER_MS, false, |game, _, _| game.banner = None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_engine::{EventBus, GameShell, Pad, PadEvent, Phase, SharedStateStore, TimerSet};

    fn ctx_parts() -> (Pad, SharedStateStore, EventBus, TimerSet<GraveHopper>, ShellState) {
        let game = GraveHopper::new();
        (
            Pad::new(),
            SharedStateStore::new(),
            EventBus::new(),
            TimerSet::new(),
            ShellState::new(game.config()),
        )
    }

    #[test]
    fn passed_stone_scores_exactly_once() {
        let (pad, _store, mut bus, mut timers, mut state) = ctx_parts();
        let mut game = GraveHopper::new();
        game.stones.push(Gravestone {
            x: PLAYER_X - 30.0,
            w: 10.0,
            h: 20.0,
            scored: false,
        });

        let mut ctx = ShellCtx {
            pad: &pad,
            state: &mut state,
            timers: &mut timers,
            bus: &mut bus,
        };
        game.on_update(&mut ctx, 16.0, 0.0);
        assert_eq!(state.score, POINTS_PER_STONE);

        let mut ctx = ShellCtx {
            pad: &pad,
            state: &mut state,
            timers: &mut timers,
            bus: &mut bus,
        };
        game.on_update(&mut ctx, 16.0, 16.0);
        assert_eq!(state.score, POINTS_PER_STONE);
    }

    #[test]
    fn jump_only_fires_from_the_ground() {
        let (mut pad, _store, mut bus, mut timers, mut state) = ctx_parts();
        let mut game = GraveHopper::new();

        pad.push(PadEvent::Down(Buttons::A));
        pad.begin_frame();
        let mut ctx = ShellCtx {
            pad: &pad,
            state: &mut state,
            timers: &mut timers,
            bus: &mut bus,
        };
        game.on_update(&mut ctx, 16.0, 0.0);
        assert!(game.vel_y < 0.0);
        assert!(!game.grounded());
    }

    #[test]
    fn unavoided_grave_eventually_costs_a_life() {
        let mut shell = GameShell::new(GraveHopper::new());
        let mut pad = Pad::new();
        let store = SharedStateStore::new();
        let mut bus = EventBus::new();
        let mut frame = FrameBuffer::new();

        shell.start(&pad, &store, &mut bus);
        pad.push(PadEvent::Down(Buttons::START));
        pad.begin_frame();
        shell.render(&mut frame, &pad, &store, &mut bus, 16.0, 0.0);
        pad.push(PadEvent::Up(Buttons::START));
        assert_eq!(shell.state().phase(), Phase::Running);

        // Never jump: the first stone to arrive lands a hit.
        for i in 0..2000 {
            pad.begin_frame();
            frame.clear();
            shell.render(&mut frame, &pad, &store, &mut bus, 16.0, i as f64 * 16.0);
        }
        assert!(shell.state().lives < shell.state().config.starting_lives);
    }
}
