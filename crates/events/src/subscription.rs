//! Subscription handle tying a listener's registration to its owner

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::bus::Registry;

pub(crate) type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;
pub(crate) type HandlerSlot<T> = Arc<RwLock<Handler<T>>>;

/// Type-erased callback stored in the registry.
///
/// Returns `true` when the payload decoded and the handler ran.
pub(crate) type Callback = Box<dyn Fn(&Value) -> bool + Send + Sync>;

pub(crate) struct Listener {
    pub(crate) id: Uuid,
    pub(crate) event_type: String,
    active: AtomicBool,
    callback: Callback,
}

impl Listener {
    pub(crate) fn new(event_type: String, callback: Callback) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            active: AtomicBool::new(true),
            callback,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    /// Run the callback unless the listener was deregistered in the meantime.
    pub(crate) fn deliver(&self, data: &Value) -> bool {
        self.is_active() && (self.callback)(data)
    }
}

pub(crate) fn current_handler<T>(slot: &HandlerSlot<T>) -> Handler<T> {
    Arc::clone(&slot.read().unwrap_or_else(PoisonError::into_inner))
}

/// A live registration on a [`MessageChannel`](crate::MessageChannel).
///
/// The listener is registered when the handle is created and removed when it
/// is dropped, whichever way the owner goes away. Call [`dispose`](Self::dispose)
/// to release it explicitly.
///
/// # Example
///
/// ```ignore
/// let channel = MessageChannel::new();
/// let subscription = channel.subscribe("scratchcard:init", |payload: NuiPayload| {
///     println!("ticket {}", payload.serial);
/// })?;
/// // ... overlay is mounted ...
/// subscription.dispose();
/// ```
pub struct Subscription<T> {
    listener: Arc<Listener>,
    registry: Weak<Registry>,
    handler: HandlerSlot<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        listener: Arc<Listener>,
        registry: Weak<Registry>,
        handler: HandlerSlot<T>,
    ) -> Self {
        Self {
            listener,
            registry,
            handler,
        }
    }

    pub fn id(&self) -> Uuid {
        self.listener.id
    }

    pub fn event_type(&self) -> &str {
        &self.listener.event_type
    }

    pub fn is_registered(&self) -> bool {
        self.listener.is_active()
    }

    /// Swap the handler without touching the channel registration.
    pub fn replace_handler<F>(&self, handler: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let handler: Handler<T> = Arc::new(handler);
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    /// Deregister now. Equivalent to dropping the handle.
    pub fn dispose(self) {}

    fn deregister(&self) {
        if !self.listener.deactivate() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.listener.id);
        }
        debug!(
            subscription_id = %self.listener.id,
            event_type = %self.listener.event_type,
            "Subscription disposed"
        );
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.deregister();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.listener.id)
            .field("event_type", &self.listener.event_type)
            .field("registered", &self.is_registered())
            .finish()
    }
}
