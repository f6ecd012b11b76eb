use clap::{Parser, Subcommand, ValueEnum};
use codec_calibration_bench::cases;
use codec_calibration_bench::harness::{BenchConfig, Profile};
use codec_calibration_bench::printers::{ConsolePrinter, JsonPrinter};
use codec_calibration_bench::schema::RunMeta;
use codec_calibration_bench::subjects;
use codec_calibration_bench::{Printer, Procedure, SubjectVariant, SuitBuilder};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calibrate and run every case × subject × procedure combination.
    Run {
        /// Case to include. Can be provided multiple times; defaults to all.
        #[arg(short, long, value_name = "NAME", action = clap::ArgAction::Append)]
        case: Vec<String>,

        /// Which codec adapter(s) to benchmark.
        #[arg(long, value_enum, default_value_t = SubjectVariant::All)]
        subject: SubjectVariant,

        /// Procedure to include. Can be provided multiple times; defaults to both.
        #[arg(long, value_enum, action = clap::ArgAction::Append)]
        procedure: Vec<Procedure>,

        /// Concurrent workers per round.
        #[arg(short = 'j', long, default_value_t = 2)]
        parallelism: usize,

        /// Repeat count of the first round.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        times: u64,

        /// Maximum calibration rounds per case (profile default if omitted).
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Wall-clock allowance per case, in seconds.
        #[arg(long, value_name = "SECS")]
        budget_secs: Option<u64>,

        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },

    /// List built-in cases and subjects.
    List,
}

#[derive(Parser, Debug)]
#[command(name = "codec-calibration-bench")]
#[command(about = "Calibrated serialize/deserialize comparison of serde codecs")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Where to write the report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Log every round and measurement.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_thread_names(true)
        .init();
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn output(out: Option<&PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut cfg = BenchConfig::new(args.profile.into(), args.seed);

    match &args.cmd {
        Command::List => {
            let mut out = output(args.out.as_ref())?;
            writeln!(out, "cases:")?;
            for case in cases::catalog(cfg.seed) {
                writeln!(out, "  {case}")?;
            }
            writeln!(out, "subjects:")?;
            for subject in subjects::subjects(SubjectVariant::All) {
                writeln!(out, "  {}", subject.name())?;
            }
            Ok(())
        }
        Command::Run {
            case,
            subject,
            procedure,
            parallelism,
            times,
            max_rounds,
            budget_secs,
            format,
        } => {
            cfg.parallelism = *parallelism;
            cfg.initial_times = *times;
            if let Some(rounds) = max_rounds {
                cfg.calibration.max_rounds = *rounds;
            }
            cfg.calibration.time_budget = budget_secs.map(Duration::from_secs);

            let mut builder = SuitBuilder::new();
            for c in cases::select(cases::catalog(cfg.seed), case)? {
                builder.add_case(c);
            }
            for s in subjects::subjects(*subject) {
                builder.add_subject(s);
            }
            let procedures: &[Procedure] = if procedure.is_empty() {
                &Procedure::ALL
            } else {
                procedure
            };
            for p in procedures {
                builder.add_procedure(*p);
            }

            let suit = builder.build()?;
            let report = suit.execute(&cfg)?;

            let out = output(args.out.as_ref())?;
            let mut printer: Box<dyn Printer> = match format {
                Format::Human => Box::new(ConsolePrinter::new(out)),
                Format::Json => Box::new(JsonPrinter::new(
                    out,
                    RunMeta {
                        schema_version: 1,
                        bench_version: env!("CARGO_PKG_VERSION").to_string(),
                        profile: cfg.profile.as_str().to_string(),
                        seed: cfg.seed,
                        parallelism: cfg.parallelism,
                        timestamp_utc: now_utc(),
                        git_sha: git_sha_short(),
                    },
                )),
            };
            report.print(printer.as_mut())
        }
    }
}
