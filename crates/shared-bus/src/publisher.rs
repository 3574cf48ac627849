//! # In-Memory Bus
//!
//! Hosts several widgets in one process. Each widget talks to the bus through
//! its own [`WidgetTransport`], which stamps outgoing messages with the
//! widget's instance id.

use crate::subscriber::SubscriptionTable;
use crate::transport::{MessageHandler, Transport};
use crate::DEFAULT_INSTANCE_PREFIX;
use parking_lot::{Mutex, RwLock};
use shared_types::{Delivery, SenderEnvelope, WidgetId, WireBody, WireCodec};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Bus settings.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Prefix for instance ids assigned by [`InMemoryBus::connect_anonymous`].
    pub instance_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            instance_prefix: DEFAULT_INSTANCE_PREFIX.to_string(),
        }
    }
}

/// In-process publish/subscribe bus.
///
/// Published messages go through an unbounded queue and are delivered in
/// publish order, either synchronously by [`InMemoryBus::dispatch_pending`]
/// or by a task running [`InMemoryBus::run`].
pub struct InMemoryBus {
    /// Codec used to serialize sender envelopes.
    codec: Arc<dyn WireCodec>,

    /// Queue input. Taken on shutdown so the run loop can finish.
    sender: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,

    /// Queue output, held by whoever is currently dispatching.
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Delivery>>,

    /// Registered handlers.
    subscriptions: RwLock<SubscriptionTable>,

    /// Total messages accepted for delivery.
    events_published: AtomicU64,

    /// Total messages taken off the queue and handed to subscribers.
    events_delivered: AtomicU64,

    config: BusConfig,
}

impl InMemoryBus {
    /// Create a bus with default settings.
    #[must_use]
    pub fn new(codec: Arc<dyn WireCodec>) -> Arc<Self> {
        Self::with_config(codec, BusConfig::default())
    }

    /// Create a bus with explicit settings.
    #[must_use]
    pub fn with_config(codec: Arc<dyn WireCodec>, config: BusConfig) -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            codec,
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            subscriptions: RwLock::new(SubscriptionTable::new()),
            events_published: AtomicU64::new(0),
            events_delivered: AtomicU64::new(0),
            config,
        })
    }

    /// Attach a widget with a known instance id.
    #[must_use]
    pub fn connect(self: &Arc<Self>, instance_id: impl Into<WidgetId>) -> WidgetTransport {
        let instance_id = instance_id.into();
        debug!(instance_id = %instance_id, "Widget connected");
        WidgetTransport {
            bus: Arc::clone(self),
            instance_id,
        }
    }

    /// Attach a widget under a freshly generated instance id.
    #[must_use]
    pub fn connect_anonymous(self: &Arc<Self>) -> WidgetTransport {
        let id = format!("{}-{}", self.config.instance_prefix, Uuid::new_v4());
        self.connect(id)
    }

    /// Queue a message from a connected widget.
    pub fn enqueue(&self, topic: &str, widget_id: &str, body: WireBody) {
        match SenderEnvelope::new(widget_id).encode(self.codec.as_ref()) {
            Ok(sender) => self.inject(topic, sender, body),
            Err(e) => warn!(
                topic = topic,
                sender = widget_id,
                error = %e,
                "Message dropped (sender envelope not encodable)"
            ),
        }
    }

    /// Queue a message with a raw, possibly malformed, sender envelope.
    ///
    /// This is how messages from widgets outside this process enter the bus.
    pub fn inject(&self, topic: &str, sender: String, body: WireBody) {
        let delivery = Delivery {
            topic: topic.to_string(),
            sender,
            body,
        };

        let guard = self.sender.lock();
        let Some(queue) = guard.as_ref() else {
            warn!(topic = topic, "Message dropped (bus shut down)");
            return;
        };

        if queue.send(delivery).is_err() {
            warn!(topic = topic, "Message dropped (queue closed)");
            return;
        }
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Deliver every queued message, including messages queued by handlers
    /// while this call runs.
    ///
    /// Returns the number of messages delivered. A nested call from inside a
    /// handler returns 0; the outer call picks up whatever it queued.
    pub fn dispatch_pending(&self) -> usize {
        let Ok(mut receiver) = self.receiver.try_lock() else {
            return 0;
        };

        let mut delivered = 0;
        while let Ok(delivery) = receiver.try_recv() {
            self.deliver(&delivery);
            delivered += 1;
        }
        delivered
    }

    /// Deliver messages as they arrive until the bus is shut down and drained.
    pub async fn run(self: Arc<Self>) {
        debug!("[InMemoryBus] Dispatch loop started");
        let mut receiver = self.receiver.lock().await;
        while let Some(delivery) = receiver.recv().await {
            self.deliver(&delivery);
        }
        debug!("[InMemoryBus] Dispatch loop finished");
    }

    /// Stop accepting messages. Already-queued messages are still delivered.
    pub fn shutdown(&self) {
        self.sender.lock().take();
    }

    /// Number of handlers registered on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscriptions.read().count(topic)
    }

    /// Total messages accepted for delivery.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Total messages handed to subscribers.
    #[must_use]
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered.load(Ordering::Relaxed)
    }

    fn deliver(&self, delivery: &Delivery) {
        // Handlers run without the table lock held so they may (un)subscribe.
        let handlers = self.subscriptions.read().handlers_for(&delivery.topic);
        self.events_delivered.fetch_add(1, Ordering::Relaxed);

        debug!(
            topic = %delivery.topic,
            receivers = handlers.len(),
            "Message delivered"
        );

        for handler in handlers {
            handler(&delivery.sender, &delivery.body);
        }
    }

    fn subscribe_widget(&self, topic: &str, widget_id: &str, handler: MessageHandler) {
        self.subscriptions.write().add(topic, widget_id, handler);
    }

    fn unsubscribe_widget(&self, topic: &str, widget_id: &str) {
        let removed = self.subscriptions.write().remove(topic, widget_id);
        debug!(topic = topic, widget = widget_id, removed = removed, "Unsubscribed");
    }
}

/// One widget's handle on an [`InMemoryBus`].
#[derive(Clone)]
pub struct WidgetTransport {
    bus: Arc<InMemoryBus>,
    instance_id: WidgetId,
}

impl WidgetTransport {
    /// The bus this transport publishes to.
    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryBus> {
        &self.bus
    }
}

impl Transport for WidgetTransport {
    fn publish(&self, topic: &str, payload: String) {
        self.bus
            .enqueue(topic, &self.instance_id, WireBody::Text(payload));
    }

    fn subscribe(&self, topic: &str, handler: MessageHandler) {
        self.bus.subscribe_widget(topic, &self.instance_id, handler);
    }

    fn unsubscribe(&self, topic: &str) {
        self.bus.unsubscribe_widget(topic, &self.instance_id);
    }

    fn instance_id(&self) -> WidgetId {
        self.instance_id.clone()
    }
}
