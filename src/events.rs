//! Layout notifications
//!
//! Renderers subscribe once and receive a [`LayoutEvent`] after every layout
//! pass (rebuild, toggle, each cascade step, collapse-all, resize). Each
//! subscriber owns a bounded crossbeam channel. `emit()`:
//!
//! - never blocks (uses `try_send`, not `send`)
//! - never fails (a full or disconnected subscriber only bumps the drop counter)
//!
//! Disconnected subscribers are pruned on the next emit.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::session::LayoutSnapshot;

/// What caused a layout pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPass {
    /// New record snapshot, expansion state reset
    Rebuilt,
    /// A single node was toggled
    Toggled,
    /// One level of a cascading reveal was applied
    CascadeStep { level: u32, remaining: usize },
    /// Everything below the roots collapsed
    CollapsedAll,
    /// Viewport size changed
    Resized,
}

/// One notification: the cause and the resulting layout
#[derive(Debug, Clone)]
pub struct LayoutEvent {
    pub pass: LayoutPass,
    pub snapshot: LayoutSnapshot,
}

/// Fan-out emitter, one bounded channel per subscriber
#[derive(Debug, Default)]
pub struct LayoutEmitter {
    subscribers: Vec<Sender<LayoutEvent>>,
    stats: EmitterStats,
}

impl LayoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber with room for `buffer` pending events
    pub fn subscribe(&mut self, buffer: usize) -> LayoutReceiver {
        let (sender, receiver) = bounded(buffer.max(1));
        self.subscribers.push(sender);
        LayoutReceiver { receiver }
    }

    /// Deliver to every subscriber - NEVER BLOCKS.
    pub fn emit(&mut self, event: LayoutEvent) {
        let mut disconnected = Vec::new();

        for (position, sender) in self.subscribers.iter().enumerate() {
            match sender.try_send(event.clone()) {
                Ok(()) => self.stats.emitted += 1,
                Err(TrySendError::Full(_)) => {
                    // Slow renderer - drop, it will catch up on the next pass
                    self.stats.dropped += 1;
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.stats.dropped += 1;
                    disconnected.push(position);
                }
            }
        }

        for position in disconnected.into_iter().rev() {
            self.subscribers.swap_remove(position);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }
}

/// Emitter statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Deliveries that reached a subscriber channel
    pub emitted: u64,
    /// Deliveries dropped (buffer full or subscriber gone)
    pub dropped: u64,
}

impl EmitterStats {
    /// Calculate the drop rate as a fraction (0.0 to 1.0).
    pub fn drop_rate(&self) -> f64 {
        let total = self.emitted + self.dropped;
        if total == 0 {
            0.0
        } else {
            self.dropped as f64 / total as f64
        }
    }

    /// Check if the emitter is healthy (drop rate < 1%).
    pub fn is_healthy(&self) -> bool {
        self.drop_rate() < 0.01
    }
}

/// Receiving side held by a renderer
#[derive(Debug, Clone)]
pub struct LayoutReceiver {
    receiver: Receiver<LayoutEvent>,
}

impl LayoutReceiver {
    /// Blocking receive. Returns `None` once the session is dropped.
    pub fn recv(&self) -> Option<LayoutEvent> {
        self.receiver.recv().ok()
    }

    /// Returns `None` if nothing is pending.
    pub fn try_recv(&self) -> Option<LayoutEvent> {
        self.receiver.try_recv().ok()
    }

    /// Everything currently pending
    pub fn drain(&self) -> Vec<LayoutEvent> {
        self.receiver.try_iter().collect()
    }

    /// Only the newest pending event; older passes are superseded
    pub fn latest(&self) -> Option<LayoutEvent> {
        self.receiver.try_iter().last()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
