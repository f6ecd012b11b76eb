use crate::calibration::{Calibrated, RoundTrace, Termination};
use crate::executor::Outcome;
use crate::harness::Times;
use crate::procedure::Procedure;
use crate::suit::Instance;
use std::io;
use std::time::Duration;

/// One final-round result.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub instance: Instance,
    /// Repeat count the outcome was measured with.
    pub times: Times,
    pub outcome: Outcome,
}

impl ReportEntry {
    pub fn case(&self) -> &str {
        self.instance.case().name()
    }

    pub fn subject(&self) -> &str {
        self.instance.subject().name()
    }

    pub fn procedure(&self) -> Procedure {
        self.instance.procedure()
    }

    /// Fastest batch divided by the batch size.
    pub fn per_iter(&self) -> Option<Duration> {
        let d = self.outcome.duration()?;
        let nanos = d.as_nanos() / u128::from(self.times.count());
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}

/// How one case group got to its reported round.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub case: String,
    pub instances: usize,
    pub times: Times,
    pub rounds: Vec<RoundTrace>,
    pub termination: Termination,
}

/// Final-round results of every group, in execution order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
    groups: Vec<GroupSummary>,
}

impl Report {
    pub(crate) fn push_group(&mut self, case: &str, calibrated: Calibrated) {
        let Calibrated {
            results,
            times,
            rounds,
            termination,
        } = calibrated;

        self.groups.push(GroupSummary {
            case: case.to_string(),
            instances: results.len(),
            times,
            rounds,
            termination,
        });
        self.entries
            .extend(results.into_iter().map(|r| ReportEntry {
                instance: r.instance,
                times,
                outcome: r.outcome,
            }));
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries belonging to `case`, in report order.
    pub fn entries_for<'a>(&'a self, case: &'a str) -> impl Iterator<Item = &'a ReportEntry> + 'a {
        self.entries.iter().filter(move |e| e.case() == case)
    }

    pub fn print(&self, printer: &mut dyn Printer) -> io::Result<()> {
        printer.print(self)
    }
}

/// Renders a finished report.
pub trait Printer {
    fn print(&mut self, report: &Report) -> io::Result<()>;
}
