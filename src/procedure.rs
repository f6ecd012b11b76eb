use crate::cases::Case;
use crate::error::Fault;
use crate::harness::{measure_min, Times};
use crate::subjects::Subject;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Direction of a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    Serialize,
    Deserialize,
}

impl Procedure {
    pub const ALL: [Procedure; 2] = [Procedure::Serialize, Procedure::Deserialize];

    pub fn as_str(&self) -> &'static str {
        match self {
            Procedure::Serialize => "serialize",
            Procedure::Deserialize => "deserialize",
        }
    }

    /// Time this procedure of `subject` on `case`'s payload.
    ///
    /// Deserialize encodes once outside the timed region and checks the decoded
    /// value against the payload before timing starts.
    pub fn invoke(
        &self,
        subject: &dyn Subject,
        case: &Case,
        times: Times,
        warmup_iters: u64,
    ) -> Result<Duration, Fault> {
        let payload = case.payload();
        match self {
            Procedure::Serialize => {
                measure_min(times, warmup_iters, || subject.serialize(payload))
            }
            Procedure::Deserialize => {
                let bytes = subject.serialize(payload)?;
                if &subject.deserialize(&bytes)? != payload {
                    return Err(Fault::Mismatch);
                }
                measure_min(times, warmup_iters, || subject.deserialize(&bytes))
            }
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
