use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Cluster {index} declares size {declared} but has {actual} cells")]
    ClusterSizeMismatch {
        index: usize,
        declared: u32,
        actual: usize,
    },
}
