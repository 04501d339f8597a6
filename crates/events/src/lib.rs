//! Host-to-overlay message channel.
//!
//! The host process posts tagged envelopes (`{"type": ..., "data": ...}`)
//! into a [`MessageChannel`]. Overlay code subscribes to a single tag and
//! gets a [`Subscription`] back; the listener stays registered exactly as
//! long as that handle is alive.

mod bus;
mod error;
mod subscription;
mod types;

pub use bus::MessageChannel;
pub use error::EventsError;
pub use subscription::Subscription;
pub use types::NuiMessage;
