use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use events::{EventsError, MessageChannel, Subscription};
use scratchcard_core::{NuiPayload, OverlayState};
use serde_json::Value;
use tracing::info;

use crate::config::ReplaySettings;

/// Headless stand-in for the overlay UI component.
///
/// Mounting subscribes to the open/close tags; the subscriptions live
/// exactly as long as the component does.
pub struct OverlayComponent {
    state: Arc<Mutex<OverlayState>>,
    invocations: Arc<AtomicUsize>,
    _on_init: Subscription<NuiPayload>,
    _on_close: Subscription<Value>,
}

impl OverlayComponent {
    pub fn mount(channel: &MessageChannel, settings: &ReplaySettings) -> Result<Self, EventsError> {
        let state = Arc::new(Mutex::new(OverlayState::default()));
        let invocations = Arc::new(AtomicUsize::new(0));

        let init_state = Arc::clone(&state);
        let init_count = Arc::clone(&invocations);
        let on_init = channel.subscribe(settings.init_event.clone(), move |payload: NuiPayload| {
            init_count.fetch_add(1, Ordering::Relaxed);
            info!(
                serial = %payload.serial,
                scratched = payload.scratched,
                golden_stars = payload.golden_stars.len(),
                tiers = payload.tiers.len(),
                "Overlay opened"
            );
            lock(&init_state).open_with(payload);
        })?;

        let close_state = Arc::clone(&state);
        let close_count = Arc::clone(&invocations);
        let on_close = channel.subscribe(settings.close_event.clone(), move |_: Value| {
            close_count.fetch_add(1, Ordering::Relaxed);
            info!("Overlay closed");
            lock(&close_state).close();
        })?;

        Ok(Self {
            state,
            invocations,
            _on_init: on_init,
            _on_close: on_close,
        })
    }

    pub fn state(&self) -> OverlayState {
        lock(&self.state).clone()
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Tear down, returning the last view state.
    pub fn unmount(self) -> OverlayState {
        self.state()
    }
}

fn lock(state: &Mutex<OverlayState>) -> std::sync::MutexGuard<'_, OverlayState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
