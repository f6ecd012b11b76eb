use clap::ValueEnum;

pub mod calibration;
pub mod cases;
pub mod error;
pub mod executor;
pub mod harness;
pub mod printers;
pub mod procedure;
pub mod report;
pub mod schema;
pub mod subjects;
pub mod suit;

pub use error::{BenchError, Fault};
pub use harness::{BenchConfig, Profile, Times};
pub use procedure::Procedure;
pub use report::{Printer, Report};
pub use suit::{Suit, SuitBuilder};

/// Codec adapter(s) to benchmark.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum SubjectVariant {
    /// Every built-in adapter.
    #[default]
    All,
    /// serde_json.
    Json,
    /// bincode 1.x.
    Bincode,
    /// MessagePack via rmp-serde.
    MessagePack,
}
