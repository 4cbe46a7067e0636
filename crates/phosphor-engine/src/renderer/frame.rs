use bytemuck::{Pod, Zeroable};

use crate::api::types::Rgba;

/// Per-instance draw data written to a flat buffer for the JS renderer.
/// Must match the TypeScript protocol: 12 floats = 48 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct DrawInstance {
    /// X position in logical canvas units (top-left origin).
    pub x: f32,
    /// Y position in logical canvas units.
    pub y: f32,
    /// Width in canvas units. For glyphs this is the cell size.
    pub w: f32,
    /// Height in canvas units.
    pub h: f32,
    /// Red 0..1.
    pub r: f32,
    /// Green 0..1.
    pub g: f32,
    /// Blue 0..1.
    pub b: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub a: f32,
    /// Font atlas column (glyph instances only).
    pub glyph_col: f32,
    /// Font atlas row (glyph instances only).
    pub glyph_row: f32,
    /// Instance kind: see `KIND_RECT` / `KIND_GLYPH`.
    pub kind: f32,
    /// Reserved for protocol alignment.
    pub _pad: f32,
}

/// Solid rectangle fill.
pub const KIND_RECT: f32 = 0.0;
/// Single character cell from the font atlas.
pub const KIND_GLYPH: f32 = 1.0;

impl DrawInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// A solid rectangle.
    pub fn rect(x: f32, y: f32, w: f32, h: f32, color: Rgba) -> Self {
        Self {
            x,
            y,
            w,
            h,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
            kind: KIND_RECT,
            ..Default::default()
        }
    }

    /// A font glyph cell. `size` is the square cell edge in canvas units.
    pub fn glyph(x: f32, y: f32, size: f32, col: f32, row: f32, color: Rgba) -> Self {
        Self {
            x,
            y,
            w: size,
            h: size,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
            glyph_col: col,
            glyph_row: row,
            kind: KIND_GLYPH,
            ..Default::default()
        }
    }
}

/// Draw buffer for one frame. Cleared by the host at the top of each tick;
/// the shell and game hooks append in paint order (back to front).
pub struct FrameBuffer {
    instances: Vec<DrawInstance>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: DrawInstance) {
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[DrawInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for SharedArrayBuffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
