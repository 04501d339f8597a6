use serde::{Deserialize, Serialize};

/// One row of the reward table: clusters of at least `min_cluster` cells pay `reward`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PrizeTier {
    pub min_cluster: u32,
    pub reward: f64,
}

impl PrizeTier {
    pub fn new(min_cluster: u32, reward: f64) -> Self {
        Self {
            min_cluster,
            reward,
        }
    }
}
