//! Feed statistics tracking
//!
//! Counts packets by admission outcome, records by kind, bytes in and out,
//! peak resequencer backlog and per-packet processing latency.

use crate::protocol::RecordKind;
use crate::resequencer::Admission;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::info;

const WINDOW_SIZE: usize = 10000;

#[derive(Debug, Clone, Copy)]
pub struct LatencyStats {
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p99_us: u64,
}

#[derive(Debug, Clone)]
pub struct FeedStats {
    start_time: Option<Instant>,

    // Packets
    packets: u64,
    bytes_in: u64,
    duplicates: u64,
    early: u64,
    peak_pending: usize,

    // Records written, indexed by kind - 1
    records: [u64; 4],
    bytes_out: u64,

    // Per-packet processing latency (in microseconds)
    process_latencies: VecDeque<u64>,
}

impl FeedStats {
    pub fn new() -> Self {
        FeedStats {
            start_time: None,
            packets: 0,
            bytes_in: 0,
            duplicates: 0,
            early: 0,
            peak_pending: 0,
            records: [0; 4],
            bytes_out: 0,
            process_latencies: VecDeque::with_capacity(WINDOW_SIZE),
        }
    }

    /// Record a packet received and what the resequencer did with it
    pub fn record_packet(&mut self, size: usize, admission: Admission, pending: usize) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.packets += 1;
        self.bytes_in += size as u64;
        match admission {
            Admission::Duplicate => self.duplicates += 1,
            Admission::Buffered => self.early += 1,
            Admission::Released { .. } => {}
        }
        self.peak_pending = self.peak_pending.max(pending);
    }

    /// Record an output record written
    pub fn record_output(&mut self, kind: RecordKind) {
        self.records[kind as usize - 1] += 1;
        self.bytes_out += kind.record_len() as u64;
    }

    /// Record processing latency in microseconds
    pub fn record_process_latency(&mut self, micros: u64) {
        if self.process_latencies.len() >= WINDOW_SIZE {
            self.process_latencies.pop_front();
        }
        self.process_latencies.push_back(micros);
    }

    /// Get packets per second
    pub fn packets_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.packets as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    /// Get processing latency statistics
    pub fn process_latency_stats(&self) -> Option<LatencyStats> {
        if self.process_latencies.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = self.process_latencies.iter().copied().collect();
        sorted.sort_unstable();

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let mean = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let p50 = sorted[sorted.len() / 2];
        let p99 = sorted[(sorted.len() * 99) / 100];

        Some(LatencyStats {
            min_us: min,
            max_us: max,
            mean_us: mean,
            p50_us: p50,
            p99_us: p99,
        })
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| st.elapsed())
    }

    pub fn total_packets(&self) -> u64 {
        self.packets
    }

    pub fn total_bytes_in(&self) -> u64 {
        self.bytes_in
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn early_packets(&self) -> u64 {
        self.early
    }

    /// Largest number of packets held ahead of sequence at once
    pub fn peak_pending(&self) -> usize {
        self.peak_pending
    }

    pub fn records(&self, kind: RecordKind) -> u64 {
        self.records[kind as usize - 1]
    }

    pub fn total_records(&self) -> u64 {
        self.records.iter().sum()
    }

    pub fn total_bytes_out(&self) -> u64 {
        self.bytes_out
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Log a statistics summary
    pub fn log_summary(&self) {
        info!(
            packets = self.packets,
            bytes_in = self.bytes_in,
            duplicates = self.duplicates,
            early = self.early,
            peak_pending = self.peak_pending,
            packets_per_sec = format_args!("{:.2}", self.packets_per_sec()),
            "packet summary"
        );
        info!(
            added = self.records(RecordKind::Added),
            executed = self.records(RecordKind::Executed),
            reduced = self.records(RecordKind::Reduced),
            replaced = self.records(RecordKind::Replaced),
            bytes_out = self.bytes_out,
            "record summary"
        );

        if let Some(stats) = self.process_latency_stats() {
            info!(
                min_us = stats.min_us,
                max_us = stats.max_us,
                mean_us = format_args!("{:.2}", stats.mean_us),
                p50_us = stats.p50_us,
                p99_us = stats.p99_us,
                "packet processing latency"
            );
        }
    }
}

impl Default for FeedStats {
    fn default() -> Self {
        Self::new()
    }
}
