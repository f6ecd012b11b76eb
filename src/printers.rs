//! Console and JSON renderings of a finished report.

use crate::executor::Outcome;
use crate::procedure::Procedure;
use crate::report::{Printer, Report, ReportEntry};
use crate::schema::{CodecBenchReport, RunMeta};
use std::io::{self, Write};
use std::time::Duration;

fn format_duration(d: Duration) -> String {
    let ns = d.as_nanos() as f64;
    if ns < 1_000.0 {
        format!("{ns:.0} ns")
    } else if ns < 1_000_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else {
        format!("{:.2} s", ns / 1_000_000_000.0)
    }
}

/// Per-iteration time of the fastest subject for `procedure` within `case`.
fn fastest_per_iter(report: &Report, case: &str, procedure: Procedure) -> Option<Duration> {
    report
        .entries_for(case)
        .filter(|e| e.procedure() == procedure)
        .filter_map(ReportEntry::per_iter)
        .min()
}

/// Aligned table, one block per case, with each subject's time relative to the
/// fastest subject for the same procedure.
pub struct ConsolePrinter<W: Write> {
    out: W,
}

impl<W: Write> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Printer for ConsolePrinter<W> {
    fn print(&mut self, report: &Report) -> io::Result<()> {
        let subject_width = report
            .entries()
            .iter()
            .map(|e| e.subject().len())
            .max()
            .unwrap_or(0)
            .max("subject".len());

        for group in report.groups() {
            writeln!(
                self.out,
                "{} ({}, {} rounds, {:?})",
                group.case,
                group.times,
                group.rounds.len(),
                group.termination
            )?;
            writeln!(self.out, "{}", "-".repeat(subject_width + 40))?;

            for entry in report.entries_for(&group.case) {
                let procedure = entry.procedure();
                let detail = match (&entry.outcome, entry.per_iter()) {
                    (Outcome::Failure(fault), _) => format!("FAILED: {fault}"),
                    (Outcome::Duration(_), Some(per_iter)) => {
                        let ratio = fastest_per_iter(report, &group.case, procedure)
                            .filter(|f| !f.is_zero())
                            .map(|f| per_iter.as_secs_f64() / f.as_secs_f64())
                            .unwrap_or(1.0);
                        format!("{:>12}/iter  {ratio:>6.2}x", format_duration(per_iter))
                    }
                    (Outcome::Duration(d), None) => format_duration(*d),
                };
                writeln!(
                    self.out,
                    "  {:<subject_width$}  {:<11}  {detail}",
                    entry.subject(),
                    procedure.as_str(),
                )?;
            }
            writeln!(self.out)?;
        }

        self.out.flush()
    }
}

/// Pretty-printed JSON document with run metadata.
pub struct JsonPrinter<W: Write> {
    out: W,
    meta: RunMeta,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W, meta: RunMeta) -> Self {
        Self { out, meta }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Printer for JsonPrinter<W> {
    fn print(&mut self, report: &Report) -> io::Result<()> {
        let doc = CodecBenchReport::new(self.meta.clone(), report);
        serde_json::to_writer_pretty(&mut self.out, &doc).map_err(io::Error::other)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
