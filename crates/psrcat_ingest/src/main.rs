use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use psrcat::{csv::CatalogStats, shuffled_sample, write_catalog, write_json, Ingested};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::PathBuf, time::Instant};

/// Offline converters from raw pulsar catalogs to the viewer's JSON asset.
///
/// Every path defaults to the conventional file name in the working
/// directory, so both converters run without flags.
#[derive(Parser, Debug)]
#[command(name = "psrcat_ingest", version)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert psrcat tabular text output.
    Text {
        #[arg(long, default_value = "pulsar_data.txt")]
        input: PathBuf,

        #[arg(long, default_value = "processed_pulsar_data.json")]
        output: PathBuf,

        /// Shuffled subset for faster iteration while developing.
        #[arg(long, default_value = "sample_pulsar_data.json")]
        sample_output: PathBuf,

        #[arg(long, default_value_t = 100)]
        sample_size: usize,

        /// Seed for placeholder distances and sampling; random if unset.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert a semicolon-delimited catalog table.
    Csv {
        #[arg(long, default_value = "data_short.csv")]
        input: PathBuf,

        #[arg(long, default_value = "csv_pulsar_data.json")]
        output: PathBuf,

        /// Summary statistics (counts per period class, period range, mean distance).
        #[arg(long, default_value = "csv_pulsar_stats.json")]
        stats_output: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn report(ingested: &Ingested, started: Instant) {
    info!(
        "Kept {} records, dropped {} rows in {:.1} ms.",
        ingested.records.len(),
        ingested.dropped,
        started.elapsed().as_secs_f64() * 1e3
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let started = Instant::now();

    match args.cmd {
        Command::Text {
            input,
            output,
            sample_output,
            sample_size,
            seed,
        } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut rng = make_rng(seed);

            let ingested = psrcat::text::parse_text(&raw, &mut rng);
            report(&ingested, started);

            write_catalog(&output, &ingested.records)?;
            info!("Data written to {}", output.display());

            let sample = shuffled_sample(&ingested.records, sample_size, &mut rng);
            write_catalog(&sample_output, &sample)?;
            info!(
                "Sample data ({} pulsars) written to {}",
                sample.len(),
                sample_output.display()
            );
        }
        Command::Csv {
            input,
            output,
            stats_output,
            seed,
        } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut rng = make_rng(seed);

            let ingested = psrcat::csv::parse_csv(&raw, &mut rng);
            report(&ingested, started);

            write_catalog(&output, &ingested.records)?;
            info!("Data written to {}", output.display());

            let stats = CatalogStats::from_records(&ingested.records);
            write_json(&stats_output, &stats)?;
            info!(
                "Stats: {} total ({} fast / {} medium / {} slow), written to {}",
                stats.total,
                stats.fast_pulsars,
                stats.medium_pulsars,
                stats.slow_pulsars,
                stats_output.display()
            );
        }
    }

    Ok(())
}
