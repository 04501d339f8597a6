//! Data shapes for the scratch-card overlay.
//!
//! These types mirror what the host process sends into the web view and what
//! the overlay keeps locally. They carry no game logic.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::CoreError;
