use grave_hopper::GraveHopper;
use phosphor_console::Console;
use phosphor_engine::GameShell;

const ENTER: u32 = 13;
const X_KEY: u32 = 88;

/// Headless smoke run: tune to the channel, dismiss the title, mash jump
/// on a fixed cadence for half a minute of game time, and log what the
/// host would have drawn and played.
fn main() {
    env_logger::init();

    let mut console = Console::new();
    console.add_channel(GameShell::new(GraveHopper::new()));
    console.switch_to(13);

    let mut ts = 0.0;
    console.frame(ts);

    console.key_down(ENTER);
    ts += 16.0;
    console.frame(ts);
    console.key_up(ENTER);

    for i in 0..1800u32 {
        if i % 50 == 0 {
            console.key_down(X_KEY);
        }
        if i % 50 == 5 {
            console.key_up(X_KEY);
        }
        // The haunting escalates partway through the run.
        if i == 600 {
            console.store_mut().set_corruption(0.8);
            console.store_mut().raise_haunt_stage(2);
        }
        ts += 16.0;
        console.frame(ts);
        for sound in console.drain_sounds() {
            log::debug!("sound cue: {}", sound.name());
        }
    }

    if let Some(state) = console.active_state() {
        log::info!(
            "session over: phase {:?}, score {}, lives {}, {} instances drawn last frame",
            state.phase(),
            state.score,
            state.lives,
            console.instance_count()
        );
    }
}
