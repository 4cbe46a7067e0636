//! Bitmap font text rendering and the stock lifecycle presentations.
//!
//! Text renders through the sprite pipeline — each character becomes one
//! glyph `DrawInstance` pointing at a cell in a font atlas laid out in
//! ASCII order, typically 16 columns × 6 rows for printable ASCII (32-127).
//!
//! Also home to the HUD compositor (score, life pips, level) and the
//! default title / pause / game-over presentations the shell falls back to
//! when a game doesn't draw its own.

use crate::api::game::ChannelConfig;
use crate::api::types::Rgba;
use crate::core::shell::ShellState;
use crate::renderer::frame::{DrawInstance, FrameBuffer};
use crate::systems::glitch::{self, Rng};

/// Configuration for a bitmap font atlas.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Number of columns in the font atlas grid.
    pub cols: u32,
    /// Number of rows in the font atlas grid.
    pub rows: u32,
    /// First ASCII code in the atlas (typically 32 = space).
    pub start_char: u8,
    /// Horizontal advance as fraction of character size.
    pub spacing: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            cols: 16,
            rows: 6,
            start_char: 32,
            spacing: 0.65,
        }
    }
}

/// Convert an ASCII character to grid coordinates (col, row) in the font
/// atlas. Returns `None` if the character is outside the font's range.
pub fn char_to_grid(c: char, font: &FontConfig) -> Option<(f32, f32)> {
    let ascii = c as u32;
    let start = font.start_char as u32;

    if ascii < start {
        return None;
    }

    let index = ascii - start;
    if index >= font.cols * font.rows {
        return None;
    }

    Some(((index % font.cols) as f32, (index / font.cols) as f32))
}

/// Pixel width of a string at the given character size.
pub fn text_width(text: &str, font: &FontConfig, size: f32) -> f32 {
    text.chars().count() as f32 * size * font.spacing
}

/// Draw a string with its top-left corner at (x, y).
pub fn draw_text(
    frame: &mut FrameBuffer,
    font: &FontConfig,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: Rgba,
) {
    let mut cursor = x;
    for c in text.chars() {
        if let Some((col, row)) = char_to_grid(c, font) {
            frame.push(DrawInstance::glyph(cursor, y, size, col, row, color));
        }
        cursor += size * font.spacing;
    }
}

/// Draw a string centered on `cx`.
pub fn draw_text_centered(
    frame: &mut FrameBuffer,
    font: &FontConfig,
    text: &str,
    cx: f32,
    y: f32,
    size: f32,
    color: Rgba,
) {
    draw_text(frame, font, text, cx - text_width(text, font, size) / 2.0, y, size, color);
}

/// Draw a string distorted by the session's haunting signals: per-glyph
/// jitter scaled by corruption, character scrambling once the haunt stage
/// allows it.
pub fn draw_haunted_text(
    frame: &mut FrameBuffer,
    font: &FontConfig,
    rng: &mut Rng,
    state: &ShellState,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: Rgba,
) {
    let snap = state.haunt;
    let mut cursor = x;
    for c in text.chars() {
        let c = glitch::scramble_char(rng, c, snap);
        if let Some((col, row)) = char_to_grid(c, font) {
            let jx = glitch::jitter(rng, snap);
            let jy = glitch::jitter(rng, snap);
            frame.push(DrawInstance::glyph(cursor + jx, y + jy, size, col, row, color));
        }
        cursor += size * font.spacing;
    }
}

const HUD_MARGIN: f32 = 8.0;
const HUD_TEXT_SIZE: f32 = 14.0;
const LIFE_PIP: f32 = 10.0;

/// Composite the HUD over the gameplay frame: score (left), level
/// (center), life pips (right). Haunting distorts the score text.
pub fn compose_hud(frame: &mut FrameBuffer, state: &ShellState, font: &FontConfig, rng: &mut Rng) {
    let w = state.config.width;

    let score = format!("SCORE {:06}", state.score);
    draw_haunted_text(
        frame,
        font,
        rng,
        state,
        &score,
        HUD_MARGIN,
        HUD_MARGIN,
        HUD_TEXT_SIZE,
        Rgba::PHOSPHOR,
    );

    let level = format!("LV{:02}", state.level);
    draw_text_centered(frame, font, &level, w / 2.0, HUD_MARGIN, HUD_TEXT_SIZE, Rgba::PHOSPHOR);

    for i in 0..state.lives {
        let x = w - HUD_MARGIN - (i + 1) as f32 * (LIFE_PIP + 4.0);
        frame.push(DrawInstance::rect(
            x,
            HUD_MARGIN + 2.0,
            LIFE_PIP,
            LIFE_PIP,
            Rgba::BLOOD,
        ));
    }
}

/// Stock title presentation: backdrop, title text, prompt line.
pub fn draw_title(frame: &mut FrameBuffer, config: &ChannelConfig, font: &FontConfig) {
    let (w, h) = (config.width, config.height);
    frame.push(DrawInstance::rect(0.0, 0.0, w, h, config.backdrop));
    draw_text_centered(frame, font, &config.title_text, w / 2.0, h * 0.35, 24.0, config.title_color);
    draw_text_centered(frame, font, "PRESS START", w / 2.0, h * 0.6, 12.0, Rgba::PHOSPHOR);
}

/// Stock game-over presentation: final score plus the restart prompt.
pub fn draw_game_over(frame: &mut FrameBuffer, state: &ShellState, font: &FontConfig) {
    let (w, h) = (state.config.width, state.config.height);
    frame.push(DrawInstance::rect(0.0, 0.0, w, h, Rgba::BLACK.with_alpha(0.85)));
    draw_text_centered(frame, font, "GAME OVER", w / 2.0, h * 0.35, 24.0, Rgba::BLOOD);
    let score = format!("SCORE {:06}", state.score);
    draw_text_centered(frame, font, &score, w / 2.0, h * 0.5, 14.0, Rgba::WHITE);
    draw_text_centered(frame, font, "PRESS START", w / 2.0, h * 0.65, 12.0, Rgba::PHOSPHOR);
}

/// Pause overlay: dim the frame already drawn underneath, then the label.
pub fn draw_pause_overlay(frame: &mut FrameBuffer, config: &ChannelConfig, font: &FontConfig) {
    let (w, h) = (config.width, config.height);
    frame.push(DrawInstance::rect(0.0, 0.0, w, h, Rgba::BLACK.with_alpha(0.5)));
    draw_text_centered(frame, font, "PAUSED", w / 2.0, h * 0.45, 18.0, Rgba::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_maps_to_origin_cell() {
        let font = FontConfig::default();
        assert_eq!(char_to_grid(' ', &font), Some((0.0, 0.0)));
    }

    #[test]
    fn uppercase_a_maps_into_grid() {
        let font = FontConfig::default();
        // 'A' = 65, start 32 → index 33 → col 1, row 2 in a 16-wide grid.
        assert_eq!(char_to_grid('A', &font), Some((1.0, 2.0)));
    }

    #[test]
    fn out_of_range_chars_are_skipped() {
        let font = FontConfig::default();
        assert_eq!(char_to_grid('\n', &font), None);
        assert_eq!(char_to_grid('é', &font), None);
    }

    #[test]
    fn draw_text_emits_one_glyph_per_mapped_char() {
        let font = FontConfig::default();
        let mut frame = FrameBuffer::new();
        draw_text(&mut frame, &font, "ABC", 0.0, 0.0, 10.0, Rgba::WHITE);
        assert_eq!(frame.instance_count(), 3);
    }

    #[test]
    fn centered_text_straddles_the_center() {
        let font = FontConfig::default();
        let mut frame = FrameBuffer::new();
        draw_text_centered(&mut frame, &font, "AB", 100.0, 0.0, 10.0, Rgba::WHITE);
        let first = frame.instances()[0];
        assert!(first.x < 100.0);
    }
}
