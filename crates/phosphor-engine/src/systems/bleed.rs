//! Cross-game bleed: a transient overlay one game posts into another's
//! render output via the event bus, for effects that appear to leak
//! between otherwise-isolated channels.

use serde::{Deserialize, Serialize};

use crate::api::types::Rgba;
use crate::renderer::frame::FrameBuffer;
use crate::systems::hud::{self, FontConfig};

/// Opacity bleed overlays render at — always faint, never foreground.
pub const BLEED_ALPHA: f32 = 0.35;

const DEFAULT_DURATION_MS: f32 = 1500.0;
const DEFAULT_SIZE: f32 = 16.0;

/// A transient visual overlay posted from outside the owning instance.
/// An instance holds at most one; a newly received overlay replaces the
/// previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BleedOverlay {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color: Rgba,
    pub size: f32,
    pub remaining_ms: f32,
}

impl BleedOverlay {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            color: Rgba::BLOOD,
            size: DEFAULT_SIZE,
            remaining_ms: DEFAULT_DURATION_MS,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_duration(mut self, duration_ms: f32) -> Self {
        self.remaining_ms = duration_ms;
        self
    }
}

/// Count the held overlay down and clear the slot once its duration is
/// spent. Runs before rendering, so an overlay whose time is up this frame
/// is gone this frame.
pub fn tick(slot: &mut Option<BleedOverlay>, dt_ms: f32) {
    if let Some(overlay) = slot {
        overlay.remaining_ms -= dt_ms;
        if overlay.remaining_ms <= 0.0 {
            *slot = None;
        }
    }
}

/// Render the overlay at bleed opacity on top of whatever is already in
/// the frame.
pub fn render(frame: &mut FrameBuffer, overlay: &BleedOverlay, font: &FontConfig) {
    let color = overlay.color.with_alpha(overlay.color.a * BLEED_ALPHA);
    hud::draw_text(frame, font, &overlay.text, overlay.x, overlay.y, overlay.size, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_expires_after_its_duration() {
        let mut slot = Some(BleedOverlay::new("THEY SEE YOU", 10.0, 10.0).with_duration(1000.0));
        for _ in 0..9 {
            tick(&mut slot, 100.0);
            assert!(slot.is_some());
        }
        tick(&mut slot, 100.0);
        assert!(slot.is_none());
    }

    #[test]
    fn replacement_resets_the_countdown() {
        let mut slot = Some(BleedOverlay::new("ONE", 0.0, 0.0).with_duration(200.0));
        tick(&mut slot, 150.0);
        slot = Some(BleedOverlay::new("TWO", 0.0, 0.0).with_duration(200.0));
        tick(&mut slot, 150.0);
        assert!(slot.is_some());
        assert_eq!(slot.as_ref().unwrap().text, "TWO");
    }

    #[test]
    fn renders_below_full_opacity() {
        let overlay = BleedOverlay::new("X", 0.0, 0.0);
        let mut frame = FrameBuffer::new();
        render(&mut frame, &overlay, &FontConfig::default());
        assert_eq!(frame.instance_count(), 1);
        assert!(frame.instances()[0].a < 1.0);
    }
}
