use crate::core::shell::ShellState;

/// Callback fired when a timer's interval elapses. Receives the owning
/// game, its shell state, and the timer set itself so the callback can
/// schedule follow-up work.
pub type TimerFn<G> = Box<dyn FnMut(&mut G, &mut ShellState, &mut TimerSet<G>)>;

/// A one-shot or repeating deferred callback local to one game instance.
struct Timer<G> {
    callback: TimerFn<G>,
    interval_ms: f32,
    repeat: bool,
    elapsed_ms: f32,
}

/// The only sanctioned deferred-work primitive for a game instance.
///
/// All delayed effects route through here so that `stop()` — which clears
/// the set unconditionally — is a complete cancellation boundary: no
/// callback can fire against a torn-down game.
pub struct TimerSet<G> {
    timers: Vec<Timer<G>>,
}

impl<G> TimerSet<G> {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    /// Schedule a callback after `interval_ms` of game time, optionally
    /// repeating at that interval.
    pub fn add(
        &mut self,
        interval_ms: f32,
        repeat: bool,
        callback: impl FnMut(&mut G, &mut ShellState, &mut TimerSet<G>) + 'static,
    ) {
        self.timers.push(Timer {
            callback: Box::new(callback),
            interval_ms,
            repeat,
            elapsed_ms: 0.0,
        });
    }

    /// Accumulate `dt_ms` into every timer and fire the ones whose
    /// interval has been met, in insertion order.
    ///
    /// Fires against a fixed-length snapshot: a callback that adds a timer
    /// during this pass sees it scheduled after the survivors and it will
    /// not fire until a later pass. One-shot timers fire exactly once and
    /// are dropped; repeating timers reset their accumulator to zero.
    pub fn tick(&mut self, dt_ms: f32, game: &mut G, state: &mut ShellState) {
        let firing = std::mem::take(&mut self.timers);
        let mut keep: Vec<Timer<G>> = Vec::with_capacity(firing.len());
        for mut timer in firing {
            timer.elapsed_ms += dt_ms;
            if timer.elapsed_ms >= timer.interval_ms {
                (timer.callback)(game, state, self);
                if timer.repeat {
                    timer.elapsed_ms = 0.0;
                    keep.push(timer);
                }
            } else {
                keep.push(timer);
            }
        }
        // Timers added by callbacks during this pass land after the survivors.
        keep.append(&mut self.timers);
        self.timers = keep;
    }

    /// Drop every pending timer unconditionally. Invoked on `stop()`.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<G> Default for TimerSet<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::ChannelConfig;

    struct Probe {
        fired: Vec<u32>,
    }

    fn state() -> ShellState {
        ShellState::new(ChannelConfig::default())
    }

    #[test]
    fn one_shot_fires_exactly_once_across_small_deltas() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(55.0, false, |g, _, _| g.fired.push(0));

        for _ in 0..10 {
            timers.tick(10.0, &mut probe, &mut st);
        }
        assert_eq!(probe.fired.len(), 1);
        assert!(timers.is_empty());
    }

    #[test]
    fn repeating_timer_resets_and_fires_again() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(30.0, true, |g, _, _| g.fired.push(0));

        for _ in 0..9 {
            timers.tick(10.0, &mut probe, &mut st);
        }
        assert_eq!(probe.fired.len(), 3);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn fires_in_insertion_order() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(10.0, false, |g, _, _| g.fired.push(1));
        timers.add(10.0, false, |g, _, _| g.fired.push(2));
        timers.add(10.0, false, |g, _, _| g.fired.push(3));

        timers.tick(10.0, &mut probe, &mut st);
        assert_eq!(probe.fired, vec![1, 2, 3]);
    }

    #[test]
    fn timer_added_during_firing_waits_for_a_later_pass() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(10.0, false, |g, _, set| {
            g.fired.push(1);
            set.add(0.0, false, |g, _, _| g.fired.push(2));
        });

        timers.tick(10.0, &mut probe, &mut st);
        assert_eq!(probe.fired, vec![1]);

        timers.tick(10.0, &mut probe, &mut st);
        assert_eq!(probe.fired, vec![1, 2]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(10.0, true, |g, _, _| g.fired.push(0));
        timers.add(20.0, false, |g, _, _| g.fired.push(0));

        timers.clear();
        assert!(timers.is_empty());
        timers.tick(100.0, &mut probe, &mut st);
        assert!(probe.fired.is_empty());
    }

    #[test]
    fn callbacks_can_mutate_shell_state() {
        let mut timers: TimerSet<Probe> = TimerSet::new();
        let mut probe = Probe { fired: Vec::new() };
        let mut st = state();
        timers.add(10.0, false, |_, state, _| state.score += 100);

        timers.tick(10.0, &mut probe, &mut st);
        assert_eq!(st.score, 100);
    }
}
