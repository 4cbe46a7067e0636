use bitflags::bitflags;
use glam::IVec2;

bitflags! {
    /// The fixed logical button vocabulary: a SNES-style pad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u16 {
        const UP     = 1 << 0;
        const DOWN   = 1 << 1;
        const LEFT   = 1 << 2;
        const RIGHT  = 1 << 3;
        const A      = 1 << 4;
        const B      = 1 << 5;
        const X      = 1 << 6;
        const Y      = 1 << 7;
        const L      = 1 << 8;
        const R      = 1 << 9;
        const START  = 1 << 10;
        const SELECT = 1 << 11;
    }
}

/// The designated button that advances title/pause/game-over screens.
pub const CONFIRM: Buttons = Buttons::START;

/// Raw input event pushed by the host as it arrives (key, touch, or
/// on-screen button — the host's bindings decide which).
#[derive(Debug, Clone, Copy)]
pub enum PadEvent {
    Down(Buttons),
    Up(Buttons),
}

/// Logical pad state with per-frame edge detection.
///
/// The host pushes raw events between frames and calls `begin_frame()` once
/// at the top of each tick, before any lifecycle shell runs. Edge sets are
/// therefore stable for the full duration of a frame — the shell never
/// clears them itself, so several shells mounted at once would all observe
/// the same edges.
pub struct Pad {
    held: Buttons,
    pressed: Buttons,
    released: Buttons,
    queue: Vec<PadEvent>,
}

impl Pad {
    pub fn new() -> Self {
        Self {
            held: Buttons::empty(),
            pressed: Buttons::empty(),
            released: Buttons::empty(),
            queue: Vec::with_capacity(16),
        }
    }

    /// Push a raw event. Called by the host as events arrive.
    pub fn push(&mut self, event: PadEvent) {
        self.queue.push(event);
    }

    /// Start a new frame: clear the edge sets and fold queued raw events
    /// into held/pressed/released.
    ///
    /// A press and release of the same button arriving within one frame
    /// window would leave a "just pressed" button that is not held, breaking
    /// the edge invariant. Instead the release is deferred to the next
    /// frame, so the press edge stays observable for exactly one frame.
    pub fn begin_frame(&mut self) {
        self.pressed = Buttons::empty();
        self.released = Buttons::empty();

        let events = std::mem::take(&mut self.queue);
        for event in events {
            match event {
                PadEvent::Down(b) => {
                    // Key repeat produces Down events while held: no new edge.
                    self.pressed |= b & !self.held;
                    self.held |= b;
                }
                PadEvent::Up(b) => {
                    let tapped = b & self.pressed;
                    if !tapped.is_empty() {
                        self.queue.push(PadEvent::Up(tapped));
                    }
                    let releasing = b & self.held & !tapped;
                    self.released |= releasing;
                    self.held &= !releasing;
                }
            }
        }
    }

    /// Whether the button is currently held.
    pub fn is_pressed(&self, button: Buttons) -> bool {
        self.held.contains(button)
    }

    /// Whether the button went down this frame.
    pub fn just_pressed(&self, button: Buttons) -> bool {
        self.pressed.contains(button)
    }

    /// Whether the button went up this frame.
    pub fn just_released(&self, button: Buttons) -> bool {
        self.released.contains(button)
    }

    /// Four-way directional input as a vector with each axis in {-1, 0, 1}.
    /// Opposite held buttons cancel to 0. Y grows downward (canvas space).
    pub fn direction(&self) -> IVec2 {
        let x = self.held.contains(Buttons::RIGHT) as i32
            - self.held.contains(Buttons::LEFT) as i32;
        let y = self.held.contains(Buttons::DOWN) as i32
            - self.held.contains(Buttons::UP) as i32;
        IVec2::new(x, y)
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}
