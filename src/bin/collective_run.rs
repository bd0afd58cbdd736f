use clap::Parser;
use collnet_rs::job::{
    JobConfig, JobError, JobReport, JobValue, JobValues, SCHEMA_VERSION, SumOpKind, run_job,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "collective-run",
    about = "Run one collective operation over an in-process group of hosts"
)]
struct Args {
    /// Path to job.json; inline flags are ignored when given
    #[arg(long)]
    job: Option<PathBuf>,

    /// Number of hosts in the group (defaults to the number of values)
    #[arg(long)]
    hosts: Option<usize>,

    /// Collective: prefix_sum, ex_prefix_sum, prefix_sum_hypercube, broadcast,
    /// broadcast_trivial, reduce, all_reduce, all_reduce_hypercube
    #[arg(long, default_value = "all_reduce")]
    collective: String,

    /// Combining operator: sum, product, min, max or concat
    #[arg(long, default_value = "sum")]
    op: String,

    /// Comma-separated per-host values, ordered by rank
    #[arg(long)]
    values: Option<String>,

    /// Root of reduce / origin of broadcast
    #[arg(long)]
    root: Option<usize>,

    /// Exclusive prefix sum for `prefix_sum`
    #[arg(long)]
    exclusive: bool,

    /// Starting element of a prefix sum; host 0 of an exclusive scan gets it
    #[arg(long)]
    initial: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn job_from_args(args: &Args) -> Result<JobConfig, String> {
    if let Some(path) = &args.job {
        return JobConfig::from_path(path).map_err(|e| e.to_string());
    }
    let values = args
        .values
        .as_deref()
        .map(JobValues::parse_list)
        .ok_or_else(|| "either --job or --values is required".to_string())?;
    // "7" is a string when the values are strings.
    let initial = args.initial.as_deref().map(|raw| match (&values, JobValue::parse(raw)) {
        (JobValues::Strings(_), JobValue::Int(_)) => JobValue::Str(raw.trim().to_owned()),
        (_, parsed) => parsed,
    });
    Ok(JobConfig {
        schema_version: SCHEMA_VERSION,
        num_hosts: args.hosts.unwrap_or(values.len()),
        collective: args.collective.clone(),
        op: SumOpKind::parse(&args.op)?,
        values,
        root: args.root,
        inclusive: Some(!args.exclusive),
        initial,
    })
}

fn print_report(report: &JobReport) {
    println!(
        "collective={} op={} hosts={} max_rounds={}",
        report.collective, report.op, report.num_hosts, report.max_rounds
    );
    for host in &report.hosts {
        let value = host
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "rank {} value={} sent={} received={}",
            host.rank, value, host.stats.sent_msgs, host.stats.received_msgs
        );
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let cfg = match job_from_args(&args) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let report = match run_job(&cfg) {
        Ok(report) => report,
        Err(err @ JobError::Collective { .. }) => {
            eprintln!("collective failed: {err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("error: failed to encode report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report);
    }
    ExitCode::SUCCESS
}
