use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::systems::bleed::BleedOverlay;

/// Subscription key for a message class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Pause,
    Resume,
    Bleed,
    Narrative,
    Glitch,
    StateChange,
}

/// A typed message on the bus.
///
/// `Pause`/`Resume`/`StateChange` are produced by the core; `Bleed`,
/// `Narrative` and `Glitch` are domain topics games publish and consume —
/// the lifecycle machinery routes them without interpreting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BusMessage {
    Pause { channel: u32 },
    Resume { channel: u32 },
    Bleed { target: u32, overlay: BleedOverlay },
    Narrative { cue: String },
    Glitch { stage: u32 },
    StateChange { key: String, value: Value },
}

impl BusMessage {
    pub fn topic(&self) -> Topic {
        match self {
            BusMessage::Pause { .. } => Topic::Pause,
            BusMessage::Resume { .. } => Topic::Resume,
            BusMessage::Bleed { .. } => Topic::Bleed,
            BusMessage::Narrative { .. } => Topic::Narrative,
            BusMessage::Glitch { .. } => Topic::Glitch,
            BusMessage::StateChange { .. } => Topic::StateChange,
        }
    }
}

/// Publish/subscribe channel decoupling games from each other and from the
/// global haunting logic.
///
/// Single-threaded: publishing only enqueues. The host drains the queue once
/// per frame, after the active shell has rendered, and delivers each message
/// to the channels subscribed to its topic. Messages published during
/// delivery sit in the queue until the next frame — deferred work never
/// interrupts the current frame.
pub struct EventBus {
    queue: Vec<BusMessage>,
    subs: Vec<(u32, Topic)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            subs: Vec::new(),
        }
    }

    /// Enqueue a message for delivery on the next routing pass.
    pub fn publish(&mut self, message: BusMessage) {
        self.queue.push(message);
    }

    /// Drain all queued messages, in publication order.
    pub fn drain(&mut self) -> Vec<BusMessage> {
        std::mem::take(&mut self.queue)
    }

    /// Subscribe a channel to a topic. Duplicate subscriptions collapse.
    pub fn subscribe(&mut self, channel: u32, topic: Topic) {
        if !self.is_subscribed(channel, topic) {
            self.subs.push((channel, topic));
        }
    }

    /// Tear down every subscription held by a channel. Called as a unit
    /// when the owning instance stops.
    pub fn unsubscribe_channel(&mut self, channel: u32) {
        self.subs.retain(|(c, _)| *c != channel);
    }

    pub fn is_subscribed(&self, channel: u32, topic: Topic) -> bool {
        self.subs.iter().any(|(c, t)| *c == channel && *t == topic)
    }

    /// Enumerate a channel's live subscriptions.
    pub fn subscriptions(&self, channel: u32) -> Vec<Topic> {
        self.subs
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, t)| *t)
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_drain_preserves_order() {
        let mut bus = EventBus::new();
        bus.publish(BusMessage::Pause { channel: 3 });
        bus.publish(BusMessage::Resume { channel: 3 });
        let msgs = bus.drain();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].topic(), Topic::Pause);
        assert_eq!(msgs[1].topic(), Topic::Resume);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn duplicate_subscriptions_collapse() {
        let mut bus = EventBus::new();
        bus.subscribe(7, Topic::Narrative);
        bus.subscribe(7, Topic::Narrative);
        assert_eq!(bus.subscriptions(7).len(), 1);
    }

    #[test]
    fn unsubscribe_channel_removes_everything() {
        let mut bus = EventBus::new();
        bus.subscribe(7, Topic::Narrative);
        bus.subscribe(7, Topic::Glitch);
        bus.subscribe(9, Topic::Narrative);
        bus.unsubscribe_channel(7);
        assert!(bus.subscriptions(7).is_empty());
        assert!(bus.is_subscribed(9, Topic::Narrative));
    }
}
