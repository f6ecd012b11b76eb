//! Suit construction and per-case grouping.
//!
//! A suit is the full cross product of cases, subjects and procedures. It runs
//! one case group at a time so every subject in a group is measured with the
//! same repeat count and no two groups compete for CPU.

use crate::calibration::{calibrate, CalibrationPolicy, KeepOrder, OrderPolicy};
use crate::cases::Case;
use crate::error::BenchError;
use crate::executor::{ParallelExecutor, RoundExecutor};
use crate::harness::{BenchConfig, Times};
use crate::procedure::Procedure;
use crate::report::Report;
use crate::subjects::Subject;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// One (case, subject, procedure) combination.
#[derive(Clone)]
pub struct Instance {
    case: Arc<Case>,
    subject: Arc<dyn Subject>,
    procedure: Procedure,
}

impl Instance {
    pub fn new(case: Arc<Case>, subject: Arc<dyn Subject>, procedure: Procedure) -> Self {
        Self {
            case,
            subject,
            procedure,
        }
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn subject(&self) -> &dyn Subject {
        self.subject.as_ref()
    }

    pub fn procedure(&self) -> Procedure {
        self.procedure
    }

    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}",
            self.case.name(),
            self.subject.name(),
            self.procedure
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("case", &self.case.name())
            .field("subject", &self.subject.name())
            .field("procedure", &self.procedure)
            .finish()
    }
}

/// Instances sharing one case.
#[derive(Debug, Clone)]
pub struct ExecutionGroup {
    case: Arc<Case>,
    instances: Vec<Instance>,
}

impl ExecutionGroup {
    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }
}

#[derive(Default)]
pub struct SuitBuilder {
    cases: Vec<Case>,
    subjects: Vec<Arc<dyn Subject>>,
    procedures: Vec<Procedure>,
}

impl SuitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_case(&mut self, case: Case) -> &mut Self {
        self.cases.push(case);
        self
    }

    pub fn add_subject(&mut self, subject: Arc<dyn Subject>) -> &mut Self {
        self.subjects.push(subject);
        self
    }

    pub fn add_procedure(&mut self, procedure: Procedure) -> &mut Self {
        self.procedures.push(procedure);
        self
    }

    /// Expand the cross product. Fails if any dimension is empty.
    pub fn build(&self) -> Result<Suit, BenchError> {
        if self.cases.is_empty() {
            return Err(BenchError::EmptySuit { dimension: "cases" });
        }
        if self.subjects.is_empty() {
            return Err(BenchError::EmptySuit {
                dimension: "subjects",
            });
        }
        if self.procedures.is_empty() {
            return Err(BenchError::EmptySuit {
                dimension: "procedures",
            });
        }

        let mut instances =
            Vec::with_capacity(self.cases.len() * self.subjects.len() * self.procedures.len());
        for case in &self.cases {
            let case = Arc::new(case.clone());
            for subject in &self.subjects {
                for &procedure in &self.procedures {
                    instances.push(Instance::new(case.clone(), subject.clone(), procedure));
                }
            }
        }

        Ok(Suit { instances })
    }
}

pub struct Suit {
    instances: Vec<Instance>,
}

impl Suit {
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Partition by case, in first-seen case order. Within a group instances keep
    /// their build order.
    pub fn groups(&self) -> Vec<ExecutionGroup> {
        let mut index: HashMap<&Case, usize> = HashMap::new();
        let mut groups: Vec<ExecutionGroup> = Vec::new();

        for instance in &self.instances {
            let slot = *index.entry(instance.case()).or_insert_with(|| {
                groups.push(ExecutionGroup {
                    case: instance.case.clone(),
                    instances: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].instances.push(instance.clone());
        }

        groups
    }

    /// Run every group with a worker pool sized from `cfg`.
    pub fn execute(&self, cfg: &BenchConfig) -> Result<Report, BenchError> {
        cfg.validate()?;
        let executor = ParallelExecutor::new(cfg.parallelism, cfg.warmup_iters())?;
        Ok(self.execute_with(&executor, cfg.times(), &cfg.calibration, &KeepOrder))
    }

    /// Run every group to completion, one after another, and collect the final
    /// round of each into a report.
    pub fn execute_with(
        &self,
        executor: &dyn RoundExecutor,
        times: Times,
        policy: &CalibrationPolicy,
        order: &dyn OrderPolicy,
    ) -> Report {
        let mut report = Report::default();
        for group in self.groups() {
            let calibrated = calibrate(&group, times, executor, policy, order);
            info!(
                case = group.case().name(),
                rounds = calibrated.rounds.len(),
                termination = ?calibrated.termination,
                "case finished"
            );
            report.push_group(group.case().name(), calibrated);
        }
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cases::Payload;
    use crate::error::Fault;

    /// Named subject that never touches a real codec.
    pub(crate) struct Stub(pub &'static str);

    impl Subject for Stub {
        fn name(&self) -> &str {
            self.0
        }

        fn serialize(&self, _payload: &Payload) -> Result<Vec<u8>, Fault> {
            Ok(Vec::new())
        }

        fn deserialize(&self, _bytes: &[u8]) -> Result<Payload, Fault> {
            Ok(Payload::Rows(Vec::new()))
        }
    }

    pub(crate) fn case(name: &str) -> Case {
        Case::new(name, Payload::Rows(Vec::new()))
    }

    fn builder(cases: &[&str], subjects: &[&'static str], procedures: &[Procedure]) -> SuitBuilder {
        let mut b = SuitBuilder::new();
        for c in cases {
            b.add_case(case(c));
        }
        for s in subjects {
            b.add_subject(Arc::new(Stub(*s)));
        }
        for p in procedures {
            b.add_procedure(*p);
        }
        b
    }

    #[test]
    fn test_cross_product_size_and_order() {
        let suit = builder(&["menu", "rows"], &["a", "b"], &Procedure::ALL)
            .build()
            .unwrap();
        let labels: Vec<String> = suit.instances().iter().map(Instance::label).collect();
        assert_eq!(
            labels,
            vec![
                "menu/a/serialize",
                "menu/a/deserialize",
                "menu/b/serialize",
                "menu/b/deserialize",
                "rows/a/serialize",
                "rows/a/deserialize",
                "rows/b/serialize",
                "rows/b/deserialize",
            ]
        );
    }

    #[test]
    fn test_groups_partition_by_case() {
        let suit = builder(&["menu", "rows", "large"], &["a", "b"], &Procedure::ALL)
            .build()
            .unwrap();
        let groups = suit.groups();
        let names: Vec<&str> = groups.iter().map(|g| g.case().name()).collect();
        assert_eq!(names, vec!["menu", "rows", "large"]);

        let total: usize = groups.iter().map(|g| g.instances().len()).sum();
        assert_eq!(total, suit.instances().len());
        for g in &groups {
            assert_eq!(g.instances().len(), 4);
            assert!(g.instances().iter().all(|i| i.case() == g.case()));
        }
    }

    #[test]
    fn test_same_named_cases_share_a_group() {
        let suit = builder(&["menu", "rows", "menu"], &["a"], &[Procedure::Serialize])
            .build()
            .unwrap();
        let groups = suit.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].case().name(), "menu");
        assert_eq!(groups[0].instances().len(), 2);
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        let err = builder(&["menu"], &[], &Procedure::ALL).build().err();
        assert!(matches!(
            err,
            Some(BenchError::EmptySuit {
                dimension: "subjects"
            })
        ));
        assert!(matches!(
            builder(&[], &["a"], &Procedure::ALL).build(),
            Err(BenchError::EmptySuit { dimension: "cases" })
        ));
        assert!(matches!(
            builder(&["menu"], &["a"], &[]).build(),
            Err(BenchError::EmptySuit {
                dimension: "procedures"
            })
        ));
    }

    #[test]
    fn test_execute_real_codecs_end_to_end() {
        use crate::harness::Profile;
        use crate::subjects::subjects;
        use crate::SubjectVariant;
        use std::time::Duration;

        let mut b = SuitBuilder::new();
        for c in crate::cases::catalog(3).into_iter().take(2) {
            b.add_case(c);
        }
        for s in subjects(SubjectVariant::All) {
            b.add_subject(s);
        }
        for p in Procedure::ALL {
            b.add_procedure(p);
        }
        let suit = b.build().unwrap();

        let mut cfg = BenchConfig::new(Profile::Quick, 3);
        cfg.calibration = CalibrationPolicy {
            floor: Duration::from_millis(2),
            target: Duration::from_millis(3),
            max_rounds: 32,
            time_budget: None,
        };
        let report = suit.execute(&cfg).unwrap();

        assert_eq!(report.len(), suit.instances().len());
        assert_eq!(report.groups().len(), 2);
        assert!(report.entries().iter().all(|e| e.outcome.duration().is_some()));
        for (entry, instance) in report.entries().iter().zip(suit.instances()) {
            assert_eq!(entry.instance.label(), instance.label());
        }
    }
}
