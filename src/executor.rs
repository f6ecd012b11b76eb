//! Bounded parallel execution of one round.
//!
//! Each instance is measured on its own worker. Results land in a vector
//! pre-sized to the input and indexed by submission position, so the output
//! order matches the input no matter which worker finishes first. The call
//! returns only after every worker has finished or faulted.

use crate::error::{BenchError, Fault};
use crate::harness::Times;
use crate::suit::Instance;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::debug;

/// What one instance's measurement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Fastest timed batch.
    Duration(Duration),
    Failure(Fault),
}

impl Outcome {
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Outcome::Duration(d) => Some(*d),
            Outcome::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstanceResult {
    pub instance: Instance,
    pub outcome: Outcome,
}

/// Runs a round: one result per instance, in input order.
pub trait RoundExecutor: Sync {
    fn execute(&self, instances: &[Instance], times: Times) -> Vec<InstanceResult>;
}

pub struct ParallelExecutor {
    pool: ThreadPool,
    warmup_iters: u64,
}

impl ParallelExecutor {
    pub fn new(parallelism: usize, warmup_iters: u64) -> Result<Self, BenchError> {
        if parallelism == 0 {
            return Err(BenchError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("bench-worker-{i}"))
            .build()?;
        Ok(Self { pool, warmup_iters })
    }

    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl RoundExecutor for ParallelExecutor {
    fn execute(&self, instances: &[Instance], times: Times) -> Vec<InstanceResult> {
        let warmup_iters = self.warmup_iters;
        let mut results = Vec::with_capacity(instances.len());
        self.pool.install(|| {
            instances
                .par_iter()
                .map(|instance| run_instance(instance, times, warmup_iters))
                .collect_into_vec(&mut results);
        });
        results
    }
}

fn run_instance(instance: &Instance, times: Times, warmup_iters: u64) -> InstanceResult {
    let invoked = panic::catch_unwind(AssertUnwindSafe(|| {
        instance
            .procedure()
            .invoke(instance.subject(), instance.case(), times, warmup_iters)
    }));

    let outcome = match invoked {
        Ok(Ok(d)) => Outcome::Duration(d),
        Ok(Err(fault)) => Outcome::Failure(fault),
        Err(payload) => Outcome::Failure(Fault::Panic(panic_message(payload.as_ref()))),
    };
    debug!(instance = %instance.label(), ?outcome, "measured");

    InstanceResult {
        instance: instance.clone(),
        outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
