mod board;
mod overlay;
mod prize;

pub use board::{Cluster, Coord, Ticket, WinningCluster};
pub use overlay::{NuiPayload, OverlayState};
pub use prize::PrizeTier;
