pub mod api;
pub mod core;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::game::{ChannelConfig, GameHooks, ShellCtx};
pub use api::types::{Rgba, SoundEvent};
pub use core::bus::{BusMessage, EventBus, Topic};
pub use core::shell::{Channel, GameShell, Phase, ShellState};
pub use core::store::{HauntSnapshot, SharedStateStore, StateChange};
pub use core::time::FrameClock;
pub use core::timer::TimerSet;
pub use input::pad::{Buttons, Pad, PadEvent, CONFIRM};
pub use renderer::frame::{DrawInstance, FrameBuffer};
pub use systems::bleed::BleedOverlay;
pub use systems::glitch::Rng;
pub use systems::hud::FontConfig;
