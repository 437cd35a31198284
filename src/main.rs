use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use mc_pi::{available_parallelism, BatchSampler, PooledSampler, Sampler};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_BATCH_SIZE: usize = 1000;
const DEFAULT_THREADS: usize = 2;

/// Repeatedly samples batches and reports a running estimate of pi.
#[derive(Parser, Debug)]
#[command(name = "mc_pi", version, about)]
struct Args {
    /// Points per call; unparsable values fall back to 1000
    #[arg(short, long, default_value = "1000")]
    batch_size: String,

    /// Workers per call; unparsable values fall back to 2
    #[arg(short, long, default_value = "2")]
    threads: String,

    /// Number of calls to make
    #[arg(short = 'n', long, default_value_t = 100)]
    iterations: usize,

    /// Fix the base seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Reuse a worker pool instead of spawning threads per call
    #[arg(short, long)]
    pooled: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_or(raw: &str, fallback: usize, name: &str) -> usize {
    match raw.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            warn!(value = raw, fallback, "invalid {name}, using fallback");
            fallback
        }
    }
}

fn format_number(n: f64) -> String {
    if n >= 1e9 {
        format!("{:.1}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        format!("{n:.0}")
    }
}

/// Running counters kept by the caller across calls.
#[derive(Debug, Default)]
struct Tally {
    total: u64,
    inside: u64,
}

impl Tally {
    fn estimate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            4.0 * self.inside as f64 / self.total as f64
        }
    }
}

fn run(sampler: &dyn BatchSampler, args: &Args, batch_size: usize, threads: usize) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();
    for _ in 0..args.iterations {
        let batch = sampler
            .sample(batch_size, threads)
            .with_context(|| format!("sampling {batch_size} points on {threads} threads"))?;
        tally.total += batch.len() as u64;
        tally.inside += batch.inside_count() as u64;
    }
    Ok(tally)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let batch_size = parse_or(&args.batch_size, DEFAULT_BATCH_SIZE, "batch size");
    let threads = parse_or(&args.threads, DEFAULT_THREADS, "thread count");
    let max_threads = available_parallelism();

    info!(batch_size, threads, max_threads, pooled = args.pooled, "starting");
    if threads > max_threads {
        warn!(threads, max_threads, "more threads than hardware parallelism");
    }

    let start = Instant::now();
    let tally = if args.pooled {
        let mut pool = PooledSampler::new(threads)?;
        if let Some(seed) = args.seed {
            pool = pool.with_seed(seed);
        }
        run(&pool, &args, batch_size, threads)?
    } else {
        let mut sampler = Sampler::new();
        if let Some(seed) = args.seed {
            sampler = sampler.with_seed(seed);
        }
        run(&sampler, &args, batch_size, threads)?
    };
    let elapsed = start.elapsed();

    let pi_estimate = tally.estimate();
    println!("Monte Carlo Pi Estimation");
    println!("Threads: {} (MAX {})", threads, max_threads);
    println!("Total samples: {}", tally.total);
    println!("Points inside circle: {}", tally.inside);
    println!("Pi estimate: {:.6}", pi_estimate);
    println!("Absolute error: {:.6}", (pi_estimate - std::f64::consts::PI).abs());
    println!("Time elapsed: {}ms", elapsed.as_millis());
    println!(
        "Points per second: {}",
        format_number(tally.total as f64 / elapsed.as_secs_f64().max(f64::EPSILON))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or("5000", DEFAULT_BATCH_SIZE, "batch size"), 5000);
        assert_eq!(parse_or("abc", DEFAULT_BATCH_SIZE, "batch size"), 1000);
        assert_eq!(parse_or("", DEFAULT_THREADS, "thread count"), 2);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(950.0), "950");
        assert_eq!(format_number(12_500.0), "12.5K");
        assert_eq!(format_number(3_400_000.0), "3.4M");
        assert_eq!(format_number(2_000_000_000.0), "2.0B");
    }

    #[test]
    fn test_tally_estimate() {
        assert_eq!(Tally::default().estimate(), 0.0);
        let tally = Tally { total: 4, inside: 3 };
        assert_eq!(tally.estimate(), 3.0);
    }
}
