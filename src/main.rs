use anyhow::{Context, Result};
use clap::Parser;
use feed_normalizer::{FeedProcessor, PacketReader, SessionConfig, SessionDate, TimeBasis};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Replay a packet capture and write normalized order records")]
struct Args {
    /// Capture file of back-to-back packets, each starting with its u16 BE length
    #[arg(long, env = "FEED_INPUT", default_value = "test.in")]
    input: PathBuf,

    /// Output file; truncated at session start
    #[arg(long, env = "FEED_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Session date as yyyymmdd
    #[arg(long, env = "FEED_DATE")]
    date: u32,

    /// Measure midnight in UTC instead of the local time zone
    #[arg(long, env = "FEED_UTC")]
    utc: bool,

    /// Warn once this many packets are held waiting for a gap to close
    #[arg(long, env = "FEED_PENDING_WARN", default_value_t = SessionConfig::DEFAULT_PENDING_WARN_THRESHOLD)]
    pending_warn: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feed_normalizer=info")),
        )
        .init();

    let args = Args::parse();

    let date = SessionDate::from_yyyymmdd(args.date).context("parse --date")?;
    let basis = if args.utc { TimeBasis::Utc } else { TimeBasis::Local };
    let config = SessionConfig::new(date)
        .with_time_basis(basis)
        .with_pending_warn_threshold(args.pending_warn);

    let input = File::open(&args.input)
        .with_context(|| format!("open input {}", args.input.display()))?;
    let output = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&args.output)
        .with_context(|| format!("open output {}", args.output.display()))?;

    let mut processor = FeedProcessor::from_config(&config, BufWriter::new(output))?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        date = args.date,
        "session started"
    );

    for (index, raw) in PacketReader::new(BufReader::new(input)).enumerate() {
        let raw = raw.with_context(|| format!("read packet {index}"))?;
        if let Err(e) = processor.on_packet(&raw) {
            error!(packet = index, error = %e, "aborting session");
            processor.stats().log_summary();
            return Err(e).with_context(|| format!("process packet {index}"));
        }
    }

    let reseq = processor.resequencer();
    if reseq.pending_len() > 0 {
        info!(
            pending = reseq.pending_len(),
            expected = reseq.expected(),
            gap = reseq.gap_len(),
            "capture ended with a sequence gap open"
        );
    }
    if processor.buffered_bytes() > 0 {
        info!(bytes = processor.buffered_bytes(), "capture ended mid-message");
    }
    processor.stats().log_summary();

    Ok(())
}
