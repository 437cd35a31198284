use std::time::Instant;

use clap::Parser;
use mc_pi_async::sample_concurrently;
use tracing_subscriber::EnvFilter;

/// Fires many concurrent sampling calls and checks every result.
#[derive(Parser, Debug)]
#[command(name = "mc_pi_async", version, about)]
struct Args {
    /// Number of concurrent calls
    #[arg(short, long, default_value_t = 1000)]
    calls: usize,

    /// Points per call
    #[arg(short, long, default_value_t = 100_000)]
    batch_size: usize,

    /// Workers per call
    #[arg(short, long, default_value_t = 8)]
    threads: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!(
        "Running {} concurrent calls of {} points on {} threads each...",
        args.calls, args.batch_size, args.threads
    );
    let start = Instant::now();

    let summaries = sample_concurrently(args.calls, args.batch_size, args.threads).await?;

    let duration = start.elapsed();
    let short = summaries.iter().filter(|s| s.len != args.batch_size).count();
    let malformed = summaries.iter().filter(|s| !s.well_formed).count();
    let total: usize = summaries.iter().map(|s| s.len).sum();
    let inside: usize = summaries.iter().map(|s| s.inside).sum();

    println!("Completed in {:?}", duration);
    println!("Total samples: {}", total);
    println!("Pi estimate: {:.6}", 4.0 * inside as f64 / total.max(1) as f64);
    println!("Short batches: {}", short);
    println!("Malformed batches: {}", malformed);

    if short > 0 || malformed > 0 {
        anyhow::bail!("{short} short and {malformed} malformed batches");
    }
    println!("Done!");
    Ok(())
}
