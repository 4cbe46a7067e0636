use serde::{Deserialize, Serialize};

/// A sound event emitted by game logic.
/// The name maps to a cue registered in the host's sound manager;
/// playback is fire-and-forget and the engine never blocks on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundEvent(pub &'static str);

impl SoundEvent {
    /// Confirm/advance cue, fired when a title screen is dismissed.
    pub const CONFIRM: SoundEvent = SoundEvent("confirm");
    /// Pause/resume toggle cue.
    pub const PAUSE: SoundEvent = SoundEvent("pause");
    /// Life lost, lives remaining.
    pub const DAMAGE: SoundEvent = SoundEvent("damage");
    /// Final life lost.
    pub const DEATH: SoundEvent = SoundEvent("death");

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// RGBA color with straight (non-premultiplied) alpha, components in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    /// CRT phosphor green, the house color of the console UI.
    pub const PHOSPHOR: Rgba = Rgba::new(0.35, 1.0, 0.45, 1.0);
    /// Haunting accent used by corruption effects.
    pub const BLOOD: Rgba = Rgba::new(0.75, 0.05, 0.05, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}
