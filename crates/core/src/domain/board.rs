use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A row/column cell on the scratch-card board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Coord {
    pub r: i32,
    pub c: i32,
}

impl Coord {
    pub fn new(r: i32, c: i32) -> Self {
        Self { r, c }
    }
}

/// A connected group of matching cells.
///
/// `size` is expected to equal `cells.len()`. The producer owns that
/// contract; use [`Cluster::is_consistent`] to check it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Cluster {
    pub cells: Vec<Coord>,
    pub size: u32,
}

impl Cluster {
    /// Build a cluster whose size is taken from the cell list.
    pub fn new(cells: Vec<Coord>) -> Self {
        let size = u32::try_from(cells.len()).unwrap_or(u32::MAX);
        Self { cells, size }
    }

    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.size).map_or(false, |size| size == self.cells.len())
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct WinningCluster {
    pub reward: f64,
    pub size: u32,
}

/// Evaluated state of one scratch ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub golden_stars: Vec<Coord>,
    /// Computed on the UI side, never part of a host message.
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub winning_cluster: Option<WinningCluster>,
    pub win: bool,
}

impl Ticket {
    /// Check that every cluster's declared size matches its cells.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self
            .clusters
            .iter()
            .enumerate()
            .find(|(_, cluster)| !cluster.is_consistent())
        {
            Some((index, cluster)) => Err(CoreError::ClusterSizeMismatch {
                index,
                declared: cluster.size,
                actual: cluster.cells.len(),
            }),
            None => Ok(()),
        }
    }
}
