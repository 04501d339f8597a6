//! Message channel implementation with tag-filtered listeners

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::EventsError;
use crate::subscription::{current_handler, Callback, Handler, HandlerSlot, Listener, Subscription};
use crate::types::NuiMessage;

pub(crate) struct Registry {
    listeners: RwLock<Vec<Arc<Listener>>>,
    /// Number of messages posted (for monitoring)
    message_count: AtomicUsize,
}

impl Registry {
    fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            message_count: AtomicUsize::new(0),
        }
    }

    fn insert(&self, listener: Arc<Listener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn remove(&self, id: Uuid) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|listener| listener.id != id);
    }

    fn matching(&self, event_type: &str) -> Vec<Arc<Listener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|listener| listener.event_type == event_type)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Channel the host posts messages into and the overlay listens on
///
/// Cloning is cheap and every clone shares the same listeners.
/// Delivery is synchronous: `post_*` returns after every matching
/// handler has run.
#[derive(Clone)]
pub struct MessageChannel {
    registry: Arc<Registry>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Subscribe to messages tagged `event_type`
    ///
    /// `handler` receives the envelope's `data` decoded into `T`. Only exact,
    /// case-sensitive tag matches are delivered. A payload that does not
    /// decode into `T` is logged and skipped; use `serde_json::Value` to
    /// receive payloads untouched.
    pub fn subscribe<T, F>(
        &self,
        event_type: impl Into<String>,
        handler: F,
    ) -> Result<Subscription<T>, EventsError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(EventsError::EmptyEventType);
        }

        let initial: Handler<T> = Arc::new(handler);
        let slot: HandlerSlot<T> = Arc::new(RwLock::new(initial));
        let callback = decoding_callback(event_type.clone(), Arc::clone(&slot));

        let listener = Arc::new(Listener::new(event_type, callback));
        self.registry.insert(Arc::clone(&listener));

        debug!(
            subscription_id = %listener.id,
            event_type = %listener.event_type,
            "Subscription registered"
        );

        Ok(Subscription::new(
            listener,
            Arc::downgrade(&self.registry),
            slot,
        ))
    }

    /// Subscribe with a handler that returns a future
    ///
    /// The future is spawned on the current tokio runtime and never awaited
    /// by the channel. Without a runtime the future is dropped with a warning.
    pub fn subscribe_async<T, F, Fut>(
        &self,
        event_type: impl Into<String>,
        handler: F,
    ) -> Result<Subscription<T>, EventsError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let event_type = event_type.into();
        let tag = event_type.clone();

        self.subscribe(event_type, move |payload: T| {
            let future = handler(payload);
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(future);
                }
                Err(_) => {
                    warn!(event_type = %tag, "No async runtime, dropping handler future");
                }
            }
        })
    }

    /// Deliver a message to every listener registered for its tag
    ///
    /// Returns the number of handlers that were invoked.
    pub fn post_message(&self, message: NuiMessage<Value>) -> usize {
        self.registry.message_count.fetch_add(1, Ordering::Relaxed);

        // Snapshot so handlers can subscribe or dispose while we iterate.
        let listeners = self.registry.matching(&message.event_type);

        let invoked = listeners
            .iter()
            .filter(|listener| listener.deliver(&message.data))
            .count();

        debug!(
            event_type = %message.event_type,
            matched = listeners.len(),
            invoked,
            "Message dispatched"
        );

        invoked
    }

    /// Serialize `data` and post it under `event_type`
    pub fn post<D>(&self, event_type: impl Into<String>, data: &D) -> Result<usize, EventsError>
    where
        D: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data)?;
        Ok(self.post_message(NuiMessage::new(event_type, data)))
    }

    /// Parse a raw JSON envelope and post it
    pub fn post_raw(&self, raw: &str) -> Result<usize, EventsError> {
        let message = NuiMessage::from_json(raw)?;
        Ok(self.post_message(message))
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Get the total number of messages posted
    pub fn message_count(&self) -> usize {
        self.registry.message_count.load(Ordering::Relaxed)
    }
}

fn decoding_callback<T>(event_type: String, slot: HandlerSlot<T>) -> Callback
where
    T: DeserializeOwned + 'static,
{
    Box::new(move |data: &Value| match <T as Deserialize>::deserialize(data) {
        Ok(payload) => {
            let handler = current_handler(&slot);
            handler(payload);
            true
        }
        Err(e) => {
            warn!(
                event_type = %event_type,
                error = %e,
                "Payload does not match subscriber type, skipping handler"
            );
            false
        }
    })
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageChannel")
            .field("listener_count", &self.listener_count())
            .field("message_count", &self.message_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(Value) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        (count, move |_: Value| {
            handler_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_post_subscribe() {
        let channel = MessageChannel::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let _subscription = channel
            .subscribe("ping", move |data: Value| sink.lock().unwrap().push(data))
            .unwrap();

        let invoked = channel.post("ping", &json!({"n": 1})).unwrap();
        assert_eq!(invoked, 1);
        assert_eq!(*received.lock().unwrap(), vec![json!({"n": 1})]);
    }

    #[test]
    fn test_no_subscribers() {
        let channel = MessageChannel::new();

        // No listeners, message is dropped
        let invoked = channel.post("ping", &json!(null)).unwrap();
        assert_eq!(invoked, 0);
    }

    #[test]
    fn test_tag_match_is_exact() {
        let channel = MessageChannel::new();
        let (count, handler) = counter();
        let _subscription = channel.subscribe("scratchcard:init", handler).unwrap();

        channel.post("scratchcard:init", &json!({})).unwrap();
        channel.post("Scratchcard:Init", &json!({})).unwrap();
        channel.post("scratchcard", &json!({})).unwrap();
        channel.post("scratchcard:init:extra", &json!({})).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_event_type_rejected() {
        let channel = MessageChannel::new();
        let result = channel.subscribe("", |_: Value| {});

        assert!(matches!(result, Err(EventsError::EmptyEventType)));
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_listener_count() {
        let channel = MessageChannel::new();
        assert_eq!(channel.listener_count(), 0);

        let first = channel.subscribe("a", |_: Value| {}).unwrap();
        assert_eq!(channel.listener_count(), 1);

        let second = channel.subscribe("b", |_: Value| {}).unwrap();
        assert_eq!(channel.listener_count(), 2);

        drop(first);
        assert_eq!(channel.listener_count(), 1);

        second.dispose();
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_message_count() {
        let channel = MessageChannel::new();
        assert_eq!(channel.message_count(), 0);

        channel.post("a", &json!(1)).unwrap();
        assert_eq!(channel.message_count(), 1);

        channel.post_message(NuiMessage::new("b", json!(2)));
        assert_eq!(channel.message_count(), 2);
    }

    #[test]
    fn test_undecodable_payload_skips_handler() {
        #[derive(Deserialize)]
        struct Visibility {
            #[allow(dead_code)]
            visible: bool,
        }

        let channel = MessageChannel::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        let _subscription = channel
            .subscribe("setVisible", move |_: Visibility| {
                handler_count.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(channel.post("setVisible", &json!({"visible": "yes"})).unwrap(), 0);
        assert_eq!(channel.post("setVisible", &json!({"visible": true})).unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_post_raw() {
        let channel = MessageChannel::new();
        let (count, handler) = counter();
        let _subscription = channel.subscribe("scratchcard:close", handler).unwrap();

        assert_eq!(channel.post_raw(r#"{"type":"scratchcard:close"}"#).unwrap(), 1);
        assert!(matches!(
            channel.post_raw(r#"{"data":{}}"#),
            Err(EventsError::InvalidEnvelope(_))
        ));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone() {
        let channel1 = MessageChannel::new();
        let channel2 = channel1.clone();

        let _subscription = channel2.subscribe("a", |_: Value| {}).unwrap();
        assert_eq!(channel1.listener_count(), 1);
        assert_eq!(channel2.listener_count(), 1);
        assert_eq!(channel1.post("a", &json!(null)).unwrap(), 1);
    }

    #[test]
    fn test_subscription_outlives_channel() {
        let channel = MessageChannel::new();
        let subscription = channel.subscribe("a", |_: Value| {}).unwrap();

        drop(channel);
        assert!(subscription.is_registered());
        subscription.dispose();
    }

    #[test]
    fn test_debug_output() {
        let channel = MessageChannel::new();
        let _subscription = channel.subscribe("a", |_: Value| {}).unwrap();

        let debug = format!("{:?}", channel);
        assert!(debug.contains("listener_count: 1"));
        assert!(debug.contains("message_count: 0"));
    }
}
