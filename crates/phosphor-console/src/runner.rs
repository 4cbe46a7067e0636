use phosphor_engine::{
    BusMessage, Buttons, Channel, EventBus, FrameBuffer, FrameClock, Pad, PadEvent,
    SharedStateStore, ShellState, SoundEvent,
};

use crate::bindings::KeyBindings;

/// The "TV" wiring up the whole session.
///
/// Owns the pad, the shared state store, the event bus, the frame clock
/// and the channel lineup. Exactly one channel is active at a time; the
/// host calls `frame(ts_ms)` once per animation frame and reads the draw
/// buffer and sound outbox afterwards.
///
/// Per-tick order: fold raw input into pad edges, render the active
/// channel, republish store changes onto the bus, route the bus, collect
/// sounds. Messages published while the bus is being routed wait in the
/// queue for the next frame.
pub struct Console {
    pad: Pad,
    store: SharedStateStore,
    bus: EventBus,
    clock: FrameClock,
    bindings: KeyBindings,
    channels: Vec<Box<dyn Channel>>,
    active: Option<usize>,
    frame: FrameBuffer,
    sound_out: Vec<SoundEvent>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            pad: Pad::new(),
            store: SharedStateStore::new(),
            bus: EventBus::new(),
            clock: FrameClock::new(),
            bindings: KeyBindings::new(),
            channels: Vec::new(),
            active: None,
            frame: FrameBuffer::new(),
            sound_out: Vec::new(),
        }
    }

    /// Add a channel to the lineup. Channel numbers must be unique;
    /// a duplicate is rejected with a warning.
    pub fn add_channel(&mut self, channel: impl Channel + 'static) {
        let no = channel.channel_no();
        if self.channels.iter().any(|c| c.channel_no() == no) {
            log::warn!("channel {} already in the lineup, ignoring", no);
            return;
        }
        self.channels.push(Box::new(channel));
    }

    /// Tune to a channel: stop the outgoing instance (cancelling its
    /// timers and subscriptions) and start the incoming one.
    pub fn switch_to(&mut self, channel_no: u32) {
        let Some(next) = self
            .channels
            .iter()
            .position(|c| c.channel_no() == channel_no)
        else {
            log::warn!("no channel {} in the lineup", channel_no);
            return;
        };
        if Some(next) == self.active {
            return;
        }
        if let Some(prev) = self.active {
            self.channels[prev].stop(&self.pad, &mut self.bus);
        }
        self.active = Some(next);
        self.channels[next].start(&self.pad, &self.store, &mut self.bus);
        log::info!("tuned to channel {}", channel_no);
    }

    pub fn active_channel(&self) -> Option<u32> {
        self.active.map(|i| self.channels[i].channel_no())
    }

    /// Lifecycle bookkeeping of the active channel, for hosts that draw
    /// their own chrome around the canvas.
    pub fn active_state(&self) -> Option<&ShellState> {
        self.active.map(|i| self.channels[i].shell_state())
    }

    // -- Input --

    pub fn key_down(&mut self, key_code: u32) {
        if let Some(button) = self.bindings.button_for(key_code) {
            self.pad.push(PadEvent::Down(button));
        }
    }

    pub fn key_up(&mut self, key_code: u32) {
        if let Some(button) = self.bindings.button_for(key_code) {
            self.pad.push(PadEvent::Up(button));
        }
    }

    /// Direct button events, for touch/on-screen controls.
    pub fn button_down(&mut self, button: Buttons) {
        self.pad.push(PadEvent::Down(button));
    }

    pub fn button_up(&mut self, button: Buttons) {
        self.pad.push(PadEvent::Up(button));
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    // -- Frame driving --

    /// Run one frame from a host animation-frame timestamp.
    pub fn frame(&mut self, ts_ms: f64) {
        let dt_ms = self.clock.delta(ts_ms);
        self.tick(dt_ms, ts_ms);
    }

    /// Run one frame with an explicit delta (useful for tests and
    /// fixed-step hosts).
    pub fn tick(&mut self, dt_ms: f32, ts_ms: f64) {
        self.pad.begin_frame();
        self.frame.clear();

        if let Some(idx) = self.active {
            self.channels[idx].render(
                &mut self.frame,
                &self.pad,
                &self.store,
                &mut self.bus,
                dt_ms,
                ts_ms,
            );
        }

        // Store mutations become bus traffic, once each.
        for change in self.store.drain_changes() {
            self.bus.publish(BusMessage::StateChange {
                key: change.key,
                value: change.value,
            });
        }

        self.route_bus();

        if let Some(idx) = self.active {
            self.sound_out.extend(self.channels[idx].drain_sounds());
        }
    }

    fn route_bus(&mut self) {
        let messages = self.bus.drain();
        for message in &messages {
            match message {
                BusMessage::Bleed { target, overlay } => {
                    match self
                        .channels
                        .iter_mut()
                        .find(|c| c.channel_no() == *target)
                    {
                        Some(channel) => channel.receive_bleed(overlay.clone()),
                        None => log::warn!("bleed for unknown channel {}", target),
                    }
                }
                _ => {
                    let topic = message.topic();
                    for channel in self.channels.iter_mut() {
                        if self.bus.is_subscribed(channel.channel_no(), topic) {
                            channel.deliver(message, &self.pad, &mut self.bus);
                        }
                    }
                }
            }
        }
    }

    // -- Host-facing outputs --

    pub fn instances_ptr(&self) -> *const f32 {
        self.frame.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.frame.instance_count()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Drain the sound cues queued since the last drain.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sound_out)
    }

    /// The session store, for global progression logic.
    pub fn store(&self) -> &SharedStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SharedStateStore {
        &mut self.store
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_engine::{
        BleedOverlay, ChannelConfig, GameHooks, GameShell, Phase, ShellCtx, Topic,
    };

    struct TestGame {
        channel: u32,
    }

    impl GameHooks for TestGame {
        fn config(&self) -> ChannelConfig {
            ChannelConfig::new(format!("test-{}", self.channel), "Test Pattern", self.channel)
        }

        fn on_start(&mut self, ctx: &mut ShellCtx<Self>) {
            ctx.bus.subscribe(self.channel, Topic::Narrative);
            ctx.bus.subscribe(self.channel, Topic::StateChange);
        }

        // Message deliveries are observable from outside as score.
        fn on_message(&mut self, _message: &BusMessage, ctx: &mut ShellCtx<Self>) {
            ctx.state.score += 1;
        }
    }

    fn console_with_two_channels() -> Console {
        let mut console = Console::new();
        console.add_channel(GameShell::new(TestGame { channel: 1 }));
        console.add_channel(GameShell::new(TestGame { channel: 2 }));
        console
    }

    fn press_confirm(console: &mut Console) {
        console.key_down(13);
        console.tick(16.0, 0.0);
        console.key_up(13);
    }

    #[test]
    fn switching_back_skips_a_dismissed_title() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        assert_eq!(console.channels[0].shell_state().phase(), Phase::Title);

        press_confirm(&mut console);
        assert_eq!(console.channels[0].shell_state().phase(), Phase::Running);

        console.switch_to(2);
        assert!(!console.channels[0].shell_state().is_active());

        console.switch_to(1);
        assert_eq!(console.channels[0].shell_state().phase(), Phase::Running);
    }

    #[test]
    fn store_set_becomes_exactly_one_bus_message() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        console.tick(16.0, 0.0);

        console.store_mut().set_corruption(0.5);
        console.tick(16.0, 16.0);
        assert_eq!(console.channels[0].shell_state().score, 1);

        console.tick(16.0, 32.0);
        assert_eq!(console.channels[0].shell_state().score, 1);
    }

    #[test]
    fn bleed_routes_to_the_target_channel() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        console.bus_mut().publish(BusMessage::Bleed {
            target: 2,
            overlay: BleedOverlay::new("IT LEAKS", 20.0, 40.0),
        });
        console.tick(16.0, 0.0);
        assert!(console.channels[1].shell_state().bleed().is_some());
        assert!(console.channels[0].shell_state().bleed().is_none());
    }

    #[test]
    fn stopping_tears_down_subscriptions() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        assert!(console.bus.is_subscribed(1, Topic::Narrative));

        console.switch_to(2);
        assert!(console.bus.subscriptions(1).is_empty());

        console.bus_mut().publish(BusMessage::Narrative {
            cue: "static hiss".to_string(),
        });
        console.tick(16.0, 0.0);
        assert_eq!(console.channels[0].shell_state().score, 0);
    }

    #[test]
    fn backgrounded_gap_reaches_the_game_capped() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        console.frame(0.0);
        console.frame(2000.0);
        let played = console.channels[0].shell_state().play_time_ms;
        assert!((played - 100.0).abs() < 1e-6, "played {}", played);
    }

    #[test]
    fn unknown_channel_switch_is_a_noop() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        console.switch_to(99);
        assert_eq!(console.active_channel(), Some(1));
    }

    #[test]
    fn pause_cue_lands_in_the_sound_outbox() {
        let mut console = console_with_two_channels();
        console.switch_to(1);
        press_confirm(&mut console); // dismiss title
        console.tick(16.0, 0.0);
        console.drain_sounds();

        press_confirm(&mut console); // pause
        let sounds = console.drain_sounds();
        assert_eq!(sounds, vec![SoundEvent::PAUSE]);
    }

    #[test]
    fn duplicate_channel_numbers_are_rejected() {
        let mut console = console_with_two_channels();
        console.add_channel(GameShell::new(TestGame { channel: 1 }));
        assert_eq!(console.channels.len(), 2);
    }
}
