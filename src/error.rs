use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Errors that stop a suit before or outside of measurement.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    /// One of the suit dimensions (cases, subjects, procedures) was empty.
    #[error("cannot build a suit without {dimension}")]
    EmptySuit { dimension: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl From<BenchError> for io::Error {
    fn from(err: BenchError) -> Self {
        io::Error::other(err)
    }
}

/// Why a single instance produced no timing.
///
/// Faults are recorded per instance and never abort the round they occur in.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Fault {
    /// The codec returned an error.
    #[error("codec error: {0}")]
    Codec(String),

    /// Deserializing did not reproduce the original payload.
    #[error("round-trip mismatch")]
    Mismatch,

    /// The codec panicked inside a worker.
    #[error("panicked: {0}")]
    Panic(String),
}

impl Fault {
    pub fn codec(err: impl std::fmt::Display) -> Self {
        Fault::Codec(err.to_string())
    }
}
