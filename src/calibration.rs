//! Adaptive repeat-count calibration for one case group.
//!
//! A round runs every instance of the group at the same `Times`. If the fastest
//! successful instance took less than the floor, the repeat count is multiplied
//! by `max(2, ceil(target / fastest))` and the whole group runs again. The first
//! round whose fastest instance reaches the floor is final, and its results are
//! reported for every instance in the group.

use crate::executor::{InstanceResult, Outcome, RoundExecutor};
use crate::harness::Times;
use crate::suit::{ExecutionGroup, Instance};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Smallest duration used when computing a rescale factor.
const MIN_SIGNAL: Duration = Duration::from_nanos(1);

#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationPolicy {
    /// A round whose fastest instance reaches this is final.
    pub floor: Duration,
    /// Duration the fastest instance is scaled towards when rescaling.
    pub target: Duration,
    /// Rounds per group, including the first.
    pub max_rounds: u32,
    /// Wall-clock allowance per group; checked between rounds.
    pub time_budget: Option<Duration>,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            floor: Duration::from_secs(1),
            target: Duration::from_millis(1_200),
            max_rounds: 16,
            time_budget: None,
        }
    }
}

/// Why a group stopped calibrating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The fastest instance reached the floor.
    Floor,
    /// Every instance failed; there is nothing to calibrate against.
    NoSignal,
    RoundCap,
    TimeBudget,
}

/// Running minimum over the successful outcomes of a round.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinDuration {
    value: Option<Duration>,
}

impl MinDuration {
    pub fn visit(&mut self, outcome: &Outcome) {
        if let Outcome::Duration(d) = outcome {
            self.value = Some(self.value.map_or(*d, |v| v.min(*d)));
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<Duration> {
        self.value
    }
}

impl<'a> FromIterator<&'a Outcome> for MinDuration {
    fn from_iter<I: IntoIterator<Item = &'a Outcome>>(iter: I) -> Self {
        let mut min = MinDuration::default();
        for outcome in iter {
            min.visit(outcome);
        }
        min
    }
}

/// Multiplier applied to `Times` after a round whose fastest instance took `fastest`.
pub fn rescale_factor(fastest: Duration, target: Duration) -> u64 {
    let secs = fastest.max(MIN_SIGNAL).as_secs_f64();
    let ceiling = (target.as_secs_f64() / secs).ceil();
    // Float-to-int casts saturate.
    (ceiling as u64).max(2)
}

/// Chooses the instance order of the next round.
pub trait OrderPolicy: Sync {
    fn next_order(&self, group: &ExecutionGroup, last: &[InstanceResult]) -> Vec<Instance>;
}

/// Every round uses the group's build order.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOrder;

impl OrderPolicy for KeepOrder {
    fn next_order(&self, group: &ExecutionGroup, _last: &[InstanceResult]) -> Vec<Instance> {
        group.instances().to_vec()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundTrace {
    pub times: Times,
    pub fastest: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Calibrated {
    /// Results of the last round only.
    pub results: Vec<InstanceResult>,
    /// The `Times` the last round ran with.
    pub times: Times,
    pub rounds: Vec<RoundTrace>,
    pub termination: Termination,
}

/// Run `group` until its fastest instance reaches the floor, every instance
/// fails, or the round/time budget is spent.
pub fn calibrate(
    group: &ExecutionGroup,
    initial: Times,
    executor: &dyn RoundExecutor,
    policy: &CalibrationPolicy,
    order: &dyn OrderPolicy,
) -> Calibrated {
    let started = Instant::now();
    let mut times = initial;
    let mut input = group.instances().to_vec();
    let mut rounds = Vec::new();

    loop {
        info!(case = group.case().name(), times = %times, "executing");

        let results = executor.execute(&input, times);
        let fastest = results.iter().map(|r| &r.outcome).collect::<MinDuration>().get();
        rounds.push(RoundTrace { times, fastest });

        let termination = match fastest {
            None => Termination::NoSignal,
            Some(d) if d >= policy.floor => Termination::Floor,
            Some(_) if rounds.len() >= policy.max_rounds as usize => Termination::RoundCap,
            Some(_) if policy.time_budget.is_some_and(|b| started.elapsed() >= b) => {
                Termination::TimeBudget
            }
            Some(d) => {
                let factor = rescale_factor(d, policy.target);
                debug!(case = group.case().name(), fastest = ?d, factor, "rescaling");
                times = times.scale(factor);
                input = order.next_order(group, &results);
                continue;
            }
        };

        if matches!(termination, Termination::RoundCap | Termination::TimeBudget) {
            warn!(
                case = group.case().name(),
                rounds = rounds.len(),
                ?termination,
                "stopped before reaching the floor"
            );
        }
        return Calibrated {
            results,
            times,
            rounds,
            termination,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;
    use crate::procedure::Procedure;
    use crate::subjects::Subject;
    use crate::suit::tests::{case, Stub};
    use crate::suit::SuitBuilder;
    use std::sync::{Arc, Mutex};

    type Script = dyn Fn(&Instance, Times) -> Outcome + Sync;

    /// Answers each instance from a closure and records every round it ran.
    struct Scripted {
        script: Box<Script>,
        calls: Mutex<Vec<(Vec<String>, Times)>>,
    }

    impl Scripted {
        fn new(script: impl Fn(&Instance, Times) -> Outcome + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Vec<String>, Times)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RoundExecutor for Scripted {
        fn execute(&self, instances: &[Instance], times: Times) -> Vec<InstanceResult> {
            self.calls
                .lock()
                .unwrap()
                .push((instances.iter().map(Instance::label).collect(), times));
            instances
                .iter()
                .map(|i| InstanceResult {
                    instance: i.clone(),
                    outcome: (self.script)(i, times),
                })
                .collect()
        }
    }

    fn ms(n: u64) -> Outcome {
        Outcome::Duration(Duration::from_millis(n))
    }

    fn group(subjects: &[&'static str]) -> ExecutionGroup {
        let mut b = SuitBuilder::new();
        b.add_case(case("menu"));
        for s in subjects {
            b.add_subject(Arc::new(Stub(*s)) as Arc<dyn Subject>);
        }
        for p in Procedure::ALL {
            b.add_procedure(p);
        }
        b.build().unwrap().groups().remove(0)
    }

    fn run(group: &ExecutionGroup, executor: &Scripted) -> Calibrated {
        calibrate(
            group,
            Times::new(1),
            executor,
            &CalibrationPolicy::default(),
            &KeepOrder,
        )
    }

    #[test]
    fn test_factor_formula() {
        assert_eq!(rescale_factor(Duration::from_millis(10), Duration::from_millis(1200)), 120);
        assert_eq!(rescale_factor(Duration::from_millis(900), Duration::from_millis(1200)), 2);
        assert_eq!(rescale_factor(Duration::from_millis(500), Duration::from_millis(1200)), 3);
        assert!(rescale_factor(Duration::ZERO, Duration::from_millis(1200)) >= 2);
    }

    #[test]
    fn test_menu_rescales_once_then_reports_second_round() {
        let g = group(&["A", "B"]);
        let executor = Scripted::new(|i, times| {
            let base = match (i.subject().name(), i.procedure()) {
                ("A", Procedure::Serialize) => 400,
                ("A", Procedure::Deserialize) => 50,
                ("B", Procedure::Serialize) => 10,
                _ => 20,
            };
            ms(base * times.count())
        });

        let out = run(&g, &executor);

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.count(), 1);
        assert_eq!(calls[1].1.count(), 120);
        assert_eq!(out.times.count(), 120);
        assert_eq!(out.termination, Termination::Floor);
        assert_eq!(out.results.len(), 4);
        // Final results come from the second round for every subject.
        assert_eq!(out.results[2].outcome, ms(10 * 120));
        assert_eq!(out.results[0].outcome, ms(400 * 120));
    }

    #[test]
    fn test_single_round_when_floor_reached() {
        let mut b = SuitBuilder::new();
        b.add_case(case("rows"))
            .add_subject(Arc::new(Stub("A")))
            .add_procedure(Procedure::Serialize);
        let g = b.build().unwrap().groups().remove(0);
        let executor = Scripted::new(|_, _| ms(1_300));

        let out = run(&g, &executor);

        assert_eq!(executor.calls().len(), 1);
        assert_eq!(out.rounds.len(), 1);
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.termination, Termination::Floor);
    }

    #[test]
    fn test_all_failures_stop_after_one_round() {
        let g = group(&["A", "B"]);
        let executor = Scripted::new(|_, _| Outcome::Failure(Fault::Mismatch));

        let out = run(&g, &executor);

        assert_eq!(executor.calls().len(), 1);
        assert_eq!(out.times, Times::new(1));
        assert_eq!(out.termination, Termination::NoSignal);
        assert!(out
            .results
            .iter()
            .all(|r| r.outcome == Outcome::Failure(Fault::Mismatch)));
    }

    #[test]
    fn test_failures_excluded_from_minimum() {
        let outcomes = [
            Outcome::Failure(Fault::Codec("x".to_string())),
            ms(20),
            ms(30),
        ];
        let min: MinDuration = outcomes.iter().collect();
        assert!(min.has_value());
        assert_eq!(min.get(), Some(Duration::from_millis(20)));

        let none: MinDuration = [Outcome::Failure(Fault::Mismatch)].iter().collect();
        assert!(!none.has_value());
    }

    #[test]
    fn test_times_grow_by_factor_each_round() {
        // Durations do not depend on times at first, so growth follows the formula.
        let g = group(&["A"]);
        let executor = Scripted::new(|_, times| {
            if times.count() >= 1_000 {
                ms(1_000)
            } else {
                ms(300)
            }
        });

        let out = run(&g, &executor);

        let counts: Vec<u64> = out.rounds.iter().map(|r| r.times.count()).collect();
        // factor = max(2, ceil(1.2 / 0.3)) = 4
        assert_eq!(counts, vec![1, 4, 16, 64, 256, 1024]);
        for pair in counts.windows(2) {
            assert!(pair[1] >= pair[0] * 2);
        }
        assert_eq!(out.termination, Termination::Floor);
    }

    #[test]
    fn test_round_cap_bounds_flat_subject() {
        let g = group(&["A"]);
        let executor = Scripted::new(|_, _| ms(1));
        let policy = CalibrationPolicy {
            max_rounds: 3,
            ..CalibrationPolicy::default()
        };

        let out = calibrate(&g, Times::new(1), &executor, &policy, &KeepOrder);

        assert_eq!(executor.calls().len(), 3);
        assert_eq!(out.termination, Termination::RoundCap);
        assert_eq!(out.times, out.rounds[2].times);
    }

    #[test]
    fn test_time_budget_bounds_flat_subject() {
        let g = group(&["A"]);
        let executor = Scripted::new(|_, _| ms(1));
        let policy = CalibrationPolicy {
            time_budget: Some(Duration::ZERO),
            ..CalibrationPolicy::default()
        };

        let out = calibrate(&g, Times::new(1), &executor, &policy, &KeepOrder);

        assert_eq!(executor.calls().len(), 1);
        assert_eq!(out.termination, Termination::TimeBudget);
    }

    #[test]
    fn test_time_budget_reports_last_completed_round() {
        // Two instances per round at ~10ms each; the budget runs out after a few rounds.
        let g = group(&["A"]);
        let executor = Scripted::new(|_, _| {
            std::thread::sleep(Duration::from_millis(10));
            ms(1)
        });
        let policy = CalibrationPolicy {
            time_budget: Some(Duration::from_millis(100)),
            ..CalibrationPolicy::default()
        };

        let out = calibrate(&g, Times::new(1), &executor, &policy, &KeepOrder);

        let calls = executor.calls();
        assert!(out.rounds.len() >= 2, "{:?}", out.rounds);
        assert_eq!(calls.len(), out.rounds.len());
        assert_eq!(out.termination, Termination::TimeBudget);
        assert_eq!(Some(out.times), out.rounds.last().map(|r| r.times));
        assert_eq!(Some(out.times), calls.last().map(|c| c.1));
        assert!(out.times.count() > 1);
    }

    #[test]
    fn test_order_policy_controls_next_round() {
        struct Reverse;

        impl OrderPolicy for Reverse {
            fn next_order(&self, group: &ExecutionGroup, _last: &[InstanceResult]) -> Vec<Instance> {
                group.instances().iter().rev().cloned().collect()
            }
        }

        let g = group(&["A"]);
        let executor = Scripted::new(|_, times| {
            if times.count() > 1 {
                ms(2_000)
            } else {
                ms(500)
            }
        });

        let out = calibrate(
            &g,
            Times::new(1),
            &executor,
            &CalibrationPolicy::default(),
            &Reverse,
        );

        let calls = executor.calls();
        assert_eq!(calls[0].0, vec!["menu/A/serialize", "menu/A/deserialize"]);
        assert_eq!(calls[1].0, vec!["menu/A/deserialize", "menu/A/serialize"]);
        assert_eq!(out.results[0].instance.label(), "menu/A/deserialize");
    }

    #[test]
    fn test_keep_order_reuses_build_order() {
        let g = group(&["A", "B"]);
        let executor = Scripted::new(|_, times| ms(600 * times.count()));

        run(&g, &executor);

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, calls[1].0);
    }
}
