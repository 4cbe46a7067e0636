pub mod bleed;
pub mod glitch;
pub mod hud;
