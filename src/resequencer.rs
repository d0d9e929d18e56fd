//! Packet resequencing
//!
//! Payloads enter the byte queue exactly once, in ascending sequence order,
//! with no gaps. Early packets wait in a pending buffer until the gap in
//! front of them closes. A packet that never arrives stalls the stream and
//! grows the buffer without bound; `gap_len` and `oldest_pending` expose that.

use crate::byte_queue::ByteQueue;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// The first sequence number a session accepts
pub const INITIAL_SEQUENCE: u32 = 1;

/// What happened to one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Payload (and `released - 1` pending packets after it) went to the queue
    Released { released: usize },
    /// Packet arrived ahead of sequence and is held
    Buffered,
    /// Packet was already delivered or is already held
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct Resequencer {
    expected: u32,
    pending: BTreeMap<u32, Vec<u8>>,
    pending_bytes: usize,
}

impl Resequencer {
    pub fn new() -> Self {
        Self::starting_at(INITIAL_SEQUENCE)
    }

    pub fn starting_at(expected: u32) -> Self {
        Resequencer {
            expected,
            pending: BTreeMap::new(),
            pending_bytes: 0,
        }
    }

    /// Route one packet's payload into `queue`, or hold it until its turn
    pub fn on_packet(&mut self, sequence: u32, payload: &[u8], queue: &mut ByteQueue) -> Admission {
        if sequence < self.expected {
            debug!(sequence, expected = self.expected, "discarding duplicate packet");
            return Admission::Duplicate;
        }

        if sequence > self.expected {
            if self.pending.contains_key(&sequence) {
                debug!(sequence, "packet already pending");
                return Admission::Duplicate;
            }
            debug!(sequence, expected = self.expected, "buffering early packet");
            self.pending_bytes += payload.len();
            self.pending.insert(sequence, payload.to_vec());
            return Admission::Buffered;
        }

        queue.extend(payload);
        self.expected = self.expected.wrapping_add(1);
        let released = 1 + self.catch_up(queue);
        Admission::Released { released }
    }

    /// Release pending packets that now continue the sequence
    fn catch_up(&mut self, queue: &mut ByteQueue) -> usize {
        let mut released = 0;
        while let Some(payload) = self.pending.remove(&self.expected) {
            trace!(sequence = self.expected, "releasing pending packet");
            self.pending_bytes -= payload.len();
            queue.extend(&payload);
            self.expected = self.expected.wrapping_add(1);
            released += 1;
        }
        released
    }

    /// Next sequence number that will be delivered
    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Get number of packets held ahead of sequence
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Get total payload bytes held ahead of sequence
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Lowest sequence number currently held
    pub fn oldest_pending(&self) -> Option<u32> {
        self.pending.keys().next().copied()
    }

    /// Number of missing packets between the expected one and the oldest held one
    pub fn gap_len(&self) -> u32 {
        self.oldest_pending()
            .map(|oldest| oldest - self.expected)
            .unwrap_or(0)
    }

    /// Check if a specific sequence number is held
    pub fn is_pending(&self, sequence: u32) -> bool {
        self.pending.contains_key(&sequence)
    }
}

impl Default for Resequencer {
    fn default() -> Self {
        Self::new()
    }
}
