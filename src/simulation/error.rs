use thiserror::Error;

/// Failures reported by the network and its algorithms.
///
/// "No route" and "no outgoing edge" are ordinary outcomes and are returned
/// as values, not through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Could not allocate {requested} {what} slots")]
    Allocation { what: &'static str, requested: usize },
    #[error("{kind} index {index} out of range (table holds {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
