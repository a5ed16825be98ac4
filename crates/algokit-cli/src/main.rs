use algokit_concurrent::{
    merge_sort, ConcurrentSet, ForkJoinMergeSort, GlobalLockHashTable, FineGrainedHashTable,
    MergeSorter, SequentialMergeSort, SortMetricsSnapshot, StructuredMergeSort,
};
use algokit_core::{init_tracing, SchedulerKind, Settings};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser)]
#[command(name = "algokit")]
#[command(about = "algokit - parallel merge sort and concurrent hash table drivers", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Directory holding default.toml / {env}.toml / local.toml
    #[arg(long, global = true, env = "ALGOKIT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Configuration environment name
    #[arg(long, global = true, env = "ALGOKIT_ENV")]
    env: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort random input with one scheduler and check it against the sequential kernel
    Sort {
        /// Number of elements
        #[arg(short, long, default_value = "1000000")]
        len: usize,

        /// Scheduler to run (defaults to the configured one)
        #[arg(short, long, value_enum)]
        scheduler: Option<SchedulerArg>,

        /// Sequential cutoff (defaults to the configured one)
        #[arg(short, long)]
        threshold: Option<usize>,

        /// Dedicated worker threads (defaults to the configured count or the global pool)
        #[arg(long)]
        threads: Option<usize>,

        /// Seed for the random input
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Insert from many threads at once and report the resulting size
    Table {
        /// Concurrent inserting threads
        #[arg(long, default_value = "8")]
        threads: usize,

        /// Distinct values inserted by each thread
        #[arg(long, default_value = "100000")]
        per_thread: usize,

        /// Bucket count (defaults to the configured one)
        #[arg(short, long)]
        buckets: Option<usize>,

        /// Repeat the run on a single-mutex table for comparison
        #[arg(long)]
        baseline: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchedulerArg {
    Sequential,
    ForkJoin,
    Structured,
}

impl From<SchedulerArg> for SchedulerKind {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::Sequential => SchedulerKind::Sequential,
            SchedulerArg::ForkJoin => SchedulerKind::ForkJoin,
            SchedulerArg::Structured => SchedulerKind::Structured,
        }
    }
}

// Output structures
#[derive(Serialize)]
struct SortReport {
    scheduler: SchedulerKind,
    description: String,
    len: usize,
    threshold: usize,
    threads: usize,
    elapsed_ms: f64,
    verified: bool,
    metrics: Option<SortMetricsSnapshot>,
}

#[derive(Serialize)]
struct TableRun {
    kind: &'static str,
    buckets: usize,
    size: usize,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct TableReport {
    threads: usize,
    per_thread: usize,
    expected_size: usize,
    fine_grained: TableRun,
    baseline: Option<TableRun>,
    speedup: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = cli.config_dir.clone().unwrap_or_else(Settings::default_config_dir);
    let env_name = cli.env.clone().unwrap_or_else(Settings::default_env);
    let mut settings = Settings::load_from_sources(&config_dir, &env_name)
        .context("Failed to load configuration")?;
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }
    init_tracing(&settings.logging);

    match execute_command(&cli, &settings) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn execute_command(cli: &Cli, settings: &Settings) -> Result<serde_json::Value> {
    match &cli.command {
        Commands::Sort {
            len,
            scheduler,
            threshold,
            threads,
            seed,
        } => {
            let mut config = settings.sort.clone();
            if let Some(s) = scheduler {
                config.scheduler = (*s).into();
            }
            if let Some(t) = threshold {
                config.threshold = *t;
            }
            if threads.is_some() {
                config.num_threads = *threads;
            }
            config.validate()?;
            execute_sort_command(*len, &config, *seed)
        }
        Commands::Table {
            threads,
            per_thread,
            buckets,
            baseline,
        } => {
            let bucket_count = buckets.unwrap_or(settings.table.bucket_count);
            if bucket_count == 0 || *threads == 0 {
                bail!("buckets and threads must both be > 0");
            }
            execute_table_command(*threads, *per_thread, bucket_count, *baseline)
        }
    }
}

fn execute_sort_command(
    len: usize,
    config: &algokit_core::SortConfig,
    seed: u64,
) -> Result<serde_json::Value> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let input: Vec<u64> = (0..len).map(|_| rng.u64(..)).collect();
    let mut expected = input.clone();
    merge_sort(&mut expected);

    let mut data = input;
    info!(len, scheduler = ?config.scheduler, threshold = config.threshold, "sorting");
    let (elapsed, threads, metrics) = match config.scheduler {
        SchedulerKind::Sequential => {
            let elapsed = timed(|| SequentialMergeSort.sort(&mut data));
            (elapsed, 1, None)
        }
        SchedulerKind::ForkJoin => {
            let sorter = ForkJoinMergeSort::from_config(config)?;
            let elapsed = timed(|| sorter.sort(&mut data));
            let threads = sorter.pool().current_num_threads();
            (elapsed, threads, Some(sorter.metrics().snapshot()))
        }
        SchedulerKind::Structured => {
            let sorter = StructuredMergeSort::from_config(config)?;
            let elapsed = timed(|| sorter.sort(&mut data));
            let threads = sorter.pool().current_num_threads();
            (elapsed, threads, Some(sorter.metrics().snapshot()))
        }
    };

    let verified = data == expected;
    if !verified {
        bail!("{:?} output differs from the sequential kernel", config.scheduler);
    }

    let report = SortReport {
        scheduler: config.scheduler,
        description: config.scheduler.description().to_string(),
        len,
        threshold: config.threshold,
        threads,
        elapsed_ms: millis(elapsed),
        verified,
        metrics,
    };
    Ok(serde_json::to_value(report)?)
}

fn execute_table_command(
    threads: usize,
    per_thread: usize,
    buckets: usize,
    baseline: bool,
) -> Result<serde_json::Value> {
    let expected_size = expected_table_size(threads, per_thread)?;

    let fine = FineGrainedHashTable::<usize>::new(buckets);
    let fine_elapsed = timed(|| insert_from_threads(&fine, threads, per_thread));
    if fine.size() != expected_size {
        bail!("fine-grained table lost updates: {} != {}", fine.size(), expected_size);
    }
    let fine_grained = TableRun {
        kind: "fine_grained",
        buckets,
        size: fine.size(),
        elapsed_ms: millis(fine_elapsed),
    };

    let (baseline, speedup) = if baseline {
        let coarse = GlobalLockHashTable::<usize>::new(buckets);
        let coarse_elapsed = timed(|| insert_from_threads(&coarse, threads, per_thread));
        let speedup = coarse_elapsed.as_secs_f64() / fine_elapsed.as_secs_f64().max(f64::EPSILON);
        let run = TableRun {
            kind: "global_lock",
            buckets,
            size: coarse.size(),
            elapsed_ms: millis(coarse_elapsed),
        };
        (Some(run), Some(speedup))
    } else {
        (None, None)
    };

    let report = TableReport {
        threads,
        per_thread,
        expected_size,
        fine_grained,
        baseline,
        speedup,
    };
    Ok(serde_json::to_value(report)?)
}

/// Number of distinct keys `insert_from_threads` produces.
fn expected_table_size(threads: usize, per_thread: usize) -> Result<usize> {
    match threads.checked_mul(per_thread) {
        Some(size) => Ok(size),
        None => bail!(
            "--threads {} x --per-thread {} overflows the key space",
            threads,
            per_thread
        ),
    }
}

fn insert_from_threads<S: ConcurrentSet<usize>>(table: &S, threads: usize, per_thread: usize) {
    let barrier = Barrier::new(threads);
    thread::scope(|s| {
        for t in 0..threads {
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    table.insert(t * per_thread + i);
                }
            });
        }
    });
}

fn timed<F: FnOnce()>(f: F) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

fn print_output(format: &OutputFormat, value: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value, 0);
        }
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value, depth: usize) {
    let indent = "  ".repeat(depth);
    if let serde_json::Value::Object(map) = value {
        for (key, val) in map {
            let key_colored = key.cyan().bold();
            match val {
                serde_json::Value::String(s) => {
                    println!("{}{}: {}", indent, key_colored, s.green());
                }
                serde_json::Value::Number(n) => {
                    println!("{}{}: {}", indent, key_colored, n.to_string().yellow());
                }
                serde_json::Value::Bool(b) => {
                    let val_colored = if *b { "true".green() } else { "false".red() };
                    println!("{}{}: {}", indent, key_colored, val_colored);
                }
                serde_json::Value::Null => {
                    println!("{}{}: {}", indent, key_colored, "-".dimmed());
                }
                serde_json::Value::Object(_) => {
                    println!("{}{}:", indent, key_colored);
                    print_pretty(val, depth + 1);
                }
                serde_json::Value::Array(_) => {
                    println!("{}{}: {}", indent, key_colored, val);
                }
            }
        }
    } else {
        println!("{}{}", indent, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_size_is_threads_times_keys() {
        assert_eq!(expected_table_size(8, 100).unwrap(), 800);
        assert_eq!(expected_table_size(0, 100).unwrap(), 0);
    }

    #[test]
    fn oversized_table_run_is_rejected() {
        let err = expected_table_size(usize::MAX, 2).unwrap_err();
        assert!(err.to_string().contains("overflows"));
        assert!(execute_table_command(usize::MAX, 2, 16, false).is_err());
    }
}
