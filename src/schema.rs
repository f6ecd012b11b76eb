use crate::calibration::Termination;
use crate::error::Fault;
use crate::executor::Outcome;
use crate::procedure::Procedure;
use crate::report::{GroupSummary, Report, ReportEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub parallelism: usize,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub case: String,
    pub subject: String,
    pub procedure: Procedure,
    pub unit: String,

    pub iters: u64,
    pub samples: u32,

    /// Fastest timed batch; absent on failure.
    pub total_ns: Option<u128>,
    pub ns_per_iter: Option<f64>,

    pub fault: Option<Fault>,
}

impl From<&ReportEntry> for Measurement {
    fn from(e: &ReportEntry) -> Self {
        let (total_ns, fault) = match &e.outcome {
            Outcome::Duration(d) => (Some(d.as_nanos()), None),
            Outcome::Failure(f) => (None, Some(f.clone())),
        };
        let iters = e.times.count();
        Measurement {
            name: format!("{}.{}.{}", e.case(), e.subject(), e.procedure()),
            case: e.case().to_string(),
            subject: e.subject().to_string(),
            procedure: e.procedure(),
            unit: "ns/iter".to_string(),
            iters,
            samples: e.times.samples(),
            total_ns,
            ns_per_iter: total_ns.map(|ns| ns as f64 / iters.max(1) as f64),
            fault,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub iters: u64,
    pub fastest_ns: Option<u128>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    pub case: String,
    pub instances: usize,
    pub iters: u64,
    pub termination: Termination,
    pub rounds: Vec<Round>,
}

impl From<&GroupSummary> for Calibration {
    fn from(g: &GroupSummary) -> Self {
        Calibration {
            case: g.case.clone(),
            instances: g.instances,
            iters: g.times.count(),
            termination: g.termination,
            rounds: g
                .rounds
                .iter()
                .map(|r| Round {
                    iters: r.times.count(),
                    fastest_ns: r.fastest.map(|d| d.as_nanos()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecBenchReport {
    pub run: RunMeta,
    pub calibration: Vec<Calibration>,
    pub measurements: Vec<Measurement>,
}

impl CodecBenchReport {
    pub fn new(run: RunMeta, report: &Report) -> Self {
        Self {
            run,
            calibration: report.groups().iter().map(Calibration::from).collect(),
            measurements: report.entries().iter().map(Measurement::from).collect(),
        }
    }
}
