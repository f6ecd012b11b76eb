use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::calibration::CalibrationPolicy;
use crate::error::BenchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

/// Everything a run needs, built once and passed to the entry point.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    /// Worker bound for one round.
    pub parallelism: usize,
    /// Repeat count of the first round of every group.
    pub initial_times: u64,
    pub calibration: CalibrationPolicy,
}

impl BenchConfig {
    pub fn new(profile: Profile, seed: u64) -> Self {
        let max_rounds = match profile {
            Profile::Quick => 16,
            Profile::Full => 24,
        };
        Self {
            profile,
            seed,
            parallelism: 2,
            initial_times: 1,
            calibration: CalibrationPolicy {
                max_rounds,
                ..CalibrationPolicy::default()
            },
        }
    }

    pub fn warmup_iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 1,
            Profile::Full => 3,
        }
    }

    /// Timed batches per measurement; the fastest one is kept.
    pub fn samples(&self) -> u32 {
        match self.profile {
            Profile::Quick => 1,
            Profile::Full => 3,
        }
    }

    pub fn times(&self) -> Times {
        Times::new(self.initial_times).with_samples(self.samples())
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.parallelism == 0 {
            return Err(BenchError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.initial_times == 0 {
            return Err(BenchError::InvalidConfig(
                "initial times must be at least 1".to_string(),
            ));
        }
        if self.calibration.max_rounds == 0 {
            return Err(BenchError::InvalidConfig(
                "max rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Repeat count for one measurement.
///
/// A measurement times `count` back-to-back invocations as one batch, `samples`
/// times over, and keeps the fastest batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Times {
    count: u64,
    samples: u32,
}

impl Times {
    pub fn new(count: u64) -> Self {
        Self {
            count: count.max(1),
            samples: 1,
        }
    }

    pub fn with_samples(self, samples: u32) -> Self {
        Self {
            samples: samples.max(1),
            ..self
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Multiply the batch size. Never shrinks.
    pub fn scale(self, factor: u64) -> Self {
        Self {
            count: self.count.saturating_mul(factor.max(1)),
            ..self
        }
    }

    pub fn describe(&self) -> String {
        format!("x{} best-of-{}", self.count, self.samples)
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Time `f` according to `times` and return the fastest batch.
///
/// The first error aborts the measurement.
pub fn measure_min<T, E>(
    times: Times,
    warmup_iters: u64,
    mut f: impl FnMut() -> Result<T, E>,
) -> Result<Duration, E> {
    for _ in 0..warmup_iters {
        black_box(f()?);
    }

    let mut best: Option<Duration> = None;
    for _ in 0..times.samples {
        let start = Instant::now();
        for _ in 0..times.count {
            black_box(f()?);
        }
        let elapsed = start.elapsed();
        best = Some(best.map_or(elapsed, |b| b.min(elapsed)));
    }

    Ok(best.unwrap_or_default())
}
