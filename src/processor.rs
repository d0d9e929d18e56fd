//! Feed processor
//!
//! Owns the whole pipeline for one session:
//! packet -> resequencer -> byte queue -> decoder -> order book + encoder -> sink.
//!
//! Single-threaded by construction: `on_packet` takes `&mut self` and runs each
//! packet to completion. A multi-threaded host must funnel packets through one
//! consumer.

use crate::book_builder::OrderBook;
use crate::byte_queue::ByteQueue;
use crate::config::SessionConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::FeedResult;
use crate::packet::Packet;
use crate::resequencer::{Admission, Resequencer};
use crate::stats::FeedStats;
use std::io::Write;
use std::time::Instant;
use tracing::{trace, warn};

pub struct FeedProcessor<W: Write> {
    resequencer: Resequencer,
    queue: ByteQueue,
    book: OrderBook,
    encoder: Encoder,
    sink: W,
    stats: FeedStats,
    pending_warn_threshold: usize,
    scratch: Vec<u8>,
}

impl<W: Write> FeedProcessor<W> {
    /// `epoch_midnight_nanos` is nanoseconds from the Unix epoch to midnight
    /// of the session date; records go to `sink` in processing order.
    pub fn new(epoch_midnight_nanos: u64, sink: W) -> Self {
        FeedProcessor {
            resequencer: Resequencer::new(),
            queue: ByteQueue::new(),
            book: OrderBook::new(),
            encoder: Encoder::new(epoch_midnight_nanos),
            sink,
            stats: FeedStats::new(),
            pending_warn_threshold: SessionConfig::DEFAULT_PENDING_WARN_THRESHOLD,
            scratch: Vec::with_capacity(64),
        }
    }

    pub fn from_config(config: &SessionConfig, sink: W) -> FeedResult<Self> {
        let mut processor = Self::new(config.epoch_midnight_nanos()?, sink);
        processor.pending_warn_threshold = config.pending_warn_threshold;
        Ok(processor)
    }

    /// Process one raw UDP packet, header included
    ///
    /// Returns the number of records written. A malformed packet is rejected
    /// before any state changes. Decode and lookup failures leave everything
    /// processed before them in place.
    pub fn on_packet(&mut self, raw: &[u8]) -> FeedResult<usize> {
        let started = Instant::now();
        let packet = Packet::parse(raw)?;

        let admission = self
            .resequencer
            .on_packet(packet.sequence, packet.payload, &mut self.queue);

        let pending = self.resequencer.pending_len();
        self.stats.record_packet(raw.len(), admission, pending);
        if admission == Admission::Buffered
            && self.pending_warn_threshold.checked_add(1) == Some(pending)
        {
            warn!(
                pending,
                expected = self.resequencer.expected(),
                oldest_pending = self.resequencer.oldest_pending(),
                gap = self.resequencer.gap_len(),
                "resequencer backlog above threshold; a packet may be lost"
            );
        }

        let written = match admission {
            Admission::Released { .. } => self.drain()?,
            Admission::Buffered | Admission::Duplicate => 0,
        };

        self.stats
            .record_process_latency(started.elapsed().as_micros() as u64);
        Ok(written)
    }

    /// Decode and emit every complete message in the byte queue
    ///
    /// Called by `on_packet`; call it directly to resume after an unresolved
    /// order reference. Stops at the first partial message.
    pub fn drain(&mut self) -> FeedResult<usize> {
        let mut written = 0;
        let result = self.drain_into(&mut written);
        self.sink.flush()?;
        result.map(|()| written)
    }

    fn drain_into(&mut self, written: &mut usize) -> FeedResult<()> {
        while let Some(record) = self.queue.next_record()? {
            let msg = Decoder::decode_record(&record)?;
            let output = self.encoder.encode(&msg, &mut self.book)?;

            output.encode_into(&mut self.scratch);
            self.sink.write_all(&self.scratch)?;

            trace!(kind = ?output.kind(), "wrote record");
            self.stats.record_output(output.kind());
            *written += 1;
        }
        Ok(())
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn resequencer(&self) -> &Resequencer {
        &self.resequencer
    }

    /// Bytes received in sequence but not yet forming a full message
    pub fn buffered_bytes(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
