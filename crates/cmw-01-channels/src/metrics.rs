//! Channel counters
//!
//! Thread-safe counters shared by every channel of a [`MapApi`](crate::MapApi).
//!
//! ## Usage
//!
//! ```ignore
//! let api = MapApi::new(transport, codec);
//! api.overlay.create.send(&json!({"name": "Tracks"}));
//! assert_eq!(api.metrics().sent, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for traffic through a set of channels.
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// Messages published after validation
    pub sent: AtomicU64,
    /// Sends rejected by validation
    pub send_rejected: AtomicU64,
    /// Inbound messages taken off the transport
    pub received: AtomicU64,
    /// Inbound messages rejected before reaching a listener
    pub receive_rejected: AtomicU64,
    /// Listener invocations
    pub listener_calls: AtomicU64,
}

impl ChannelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_rejected(&self) {
        self.send_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_receive_rejected(&self) {
        self.receive_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_listener_call(&self) {
        self.listener_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            send_rejected: self.send_rejected.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            receive_rejected: self.receive_rejected.load(Ordering::Relaxed),
            listener_calls: self.listener_calls.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.sent.store(0, Ordering::Relaxed);
        self.send_rejected.store(0, Ordering::Relaxed);
        self.received.store(0, Ordering::Relaxed);
        self.receive_rejected.store(0, Ordering::Relaxed);
        self.listener_calls.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`ChannelMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sent: u64,
    pub send_rejected: u64,
    pub received: u64,
    pub receive_rejected: u64,
    pub listener_calls: u64,
}

impl MetricsSnapshot {
    /// Fraction of inbound messages that never reached a listener.
    pub fn receive_rejection_rate(&self) -> f64 {
        if self.received == 0 {
            0.0
        } else {
            self.receive_rejected as f64 / self.received as f64
        }
    }
}
