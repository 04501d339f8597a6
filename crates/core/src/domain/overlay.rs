use serde::{Deserialize, Serialize};

use super::board::Coord;
use super::prize::PrizeTier;

/// Message the host process sends to initialize or update the overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct NuiPayload {
    pub serial: String,
    pub scratched: bool,
    pub golden_stars: Vec<Coord>,
    pub tiers: Vec<PrizeTier>,
}

/// UI-local view state of the overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    pub is_open: bool,
    pub scratched: bool,
    pub golden_stars: Vec<Coord>,
    pub serial: String,
    pub tiers: Vec<PrizeTier>,
}

impl OverlayState {
    /// Take over every field the payload carries and show the overlay.
    pub fn open_with(&mut self, payload: NuiPayload) {
        self.is_open = true;
        self.serial = payload.serial;
        self.scratched = payload.scratched;
        self.golden_stars = payload.golden_stars;
        self.tiers = payload.tiers;
    }

    /// Hide the overlay, keeping the last ticket around.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn payload(&self) -> NuiPayload {
        NuiPayload {
            serial: self.serial.clone(),
            scratched: self.scratched,
            golden_stars: self.golden_stars.clone(),
            tiers: self.tiers.clone(),
        }
    }
}

impl From<NuiPayload> for OverlayState {
    fn from(payload: NuiPayload) -> Self {
        let mut state = Self::default();
        state.open_with(payload);
        state
    }
}
