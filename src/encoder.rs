//! Output record encoder
//!
//! Turns the book update a decoded message caused into one fixed-length
//! little-endian record. Timestamps are shifted from
//! nanoseconds-since-midnight to nanoseconds-since-epoch.
//!
//! Layouts (offset: field):
//!   Added    (44): 0 kind, 2 len, 4 ticker, 12 ts, 20 ref, 28 side, 29 pad(3), 32 size, 36 price
//!   Executed (40): 0 kind, 2 len, 4 ticker, 12 ts, 20 ref, 28 executed size, 32 order price
//!   Reduced  (32): 0 kind, 2 len, 4 ticker, 12 ts, 20 ref, 28 size remaining
//!   Replaced (48): 0 kind, 2 len, 4 ticker, 12 ts, 20 old ref, 28 new ref, 36 new size, 40 new price

use crate::book_builder::{BookError, BookUpdate, OrderBook};
use crate::decoder::Message;
use crate::protocol::*;

/// One normalized output event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputRecord {
    Added {
        ticker: [u8; TICKER_LEN],
        timestamp: u64,
        order_ref: u64,
        side: u8,
        size: u32,
        price: f64,
    },
    Executed {
        ticker: [u8; TICKER_LEN],
        timestamp: u64,
        order_ref: u64,
        size: u32,
        price: f64,
    },
    Reduced {
        ticker: [u8; TICKER_LEN],
        timestamp: u64,
        order_ref: u64,
        size_remaining: u32,
    },
    Replaced {
        ticker: [u8; TICKER_LEN],
        timestamp: u64,
        old_order_ref: u64,
        new_order_ref: u64,
        new_size: u32,
        new_price: f64,
    },
}

impl OutputRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            OutputRecord::Added { .. } => RecordKind::Added,
            OutputRecord::Executed { .. } => RecordKind::Executed,
            OutputRecord::Reduced { .. } => RecordKind::Reduced,
            OutputRecord::Replaced { .. } => RecordKind::Replaced,
        }
    }

    pub fn encoded_len(&self) -> usize {
        self.kind().record_len()
    }

    /// Serialize into a freshly allocated buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Serialize into the front of `out`
    ///
    /// Returns the number of bytes written, or `None` if `out` is shorter
    /// than `encoded_len()`. Nothing is written in that case.
    pub fn write_into(&self, out: &mut [u8]) -> Option<usize> {
        let len = self.encoded_len();
        let out = out.get_mut(..len)?;
        self.write_fields(out);
        Some(len)
    }

    /// Replace the contents of `out` with this record
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.encoded_len(), 0);
        self.write_fields(out);
    }

    // `out` is exactly `encoded_len()` bytes
    fn write_fields(&self, out: &mut [u8]) {
        let kind = self.kind();
        write_le(&mut out[0..], kind as u64, 2);
        write_le(&mut out[2..], kind.record_len() as u64, 2);

        match *self {
            OutputRecord::Added {
                ticker,
                timestamp,
                order_ref,
                side,
                size,
                price,
            } => {
                out[4..12].copy_from_slice(&ticker);
                write_le(&mut out[12..], timestamp, 8);
                write_le(&mut out[20..], order_ref, 8);
                out[28] = side;
                out[29..32].fill(0);
                write_le(&mut out[32..], size as u64, 4);
                write_le(&mut out[36..], price.to_bits(), 8);
            }
            OutputRecord::Executed {
                ticker,
                timestamp,
                order_ref,
                size,
                price,
            } => {
                out[4..12].copy_from_slice(&ticker);
                write_le(&mut out[12..], timestamp, 8);
                write_le(&mut out[20..], order_ref, 8);
                write_le(&mut out[28..], size as u64, 4);
                write_le(&mut out[32..], price.to_bits(), 8);
            }
            OutputRecord::Reduced {
                ticker,
                timestamp,
                order_ref,
                size_remaining,
            } => {
                out[4..12].copy_from_slice(&ticker);
                write_le(&mut out[12..], timestamp, 8);
                write_le(&mut out[20..], order_ref, 8);
                write_le(&mut out[28..], size_remaining as u64, 4);
            }
            OutputRecord::Replaced {
                ticker,
                timestamp,
                old_order_ref,
                new_order_ref,
                new_size,
                new_price,
            } => {
                out[4..12].copy_from_slice(&ticker);
                write_le(&mut out[12..], timestamp, 8);
                write_le(&mut out[20..], old_order_ref, 8);
                write_le(&mut out[28..], new_order_ref, 8);
                write_le(&mut out[36..], new_size as u64, 4);
                write_le(&mut out[40..], new_price.to_bits(), 8);
            }
        }
    }
}

/// Maps decoded messages to output records for one session date
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    epoch_midnight_nanos: u64,
}

impl Encoder {
    pub fn new(epoch_midnight_nanos: u64) -> Self {
        Encoder {
            epoch_midnight_nanos,
        }
    }

    pub fn epoch_midnight_nanos(&self) -> u64 {
        self.epoch_midnight_nanos
    }

    /// Apply `msg` to `book` and build the record describing it
    ///
    /// An unknown order ref leaves the book untouched and yields no record.
    pub fn encode(&self, msg: &Message, book: &mut OrderBook) -> Result<OutputRecord, BookError> {
        let update = book.apply_message(msg)?;
        Ok(self.record_for(msg.timestamp(), update))
    }

    /// Build the record for a book update stamped at `ts` past midnight
    pub fn record_for(&self, ts: u64, update: BookUpdate) -> OutputRecord {
        let timestamp = self.epoch_midnight_nanos.wrapping_add(ts);

        match update {
            BookUpdate::Added {
                ticker,
                order_ref,
                side,
                size,
                price,
            } => OutputRecord::Added {
                ticker,
                timestamp,
                order_ref,
                side,
                size,
                price,
            },
            BookUpdate::Executed {
                ticker,
                order_ref,
                executed,
                price,
                ..
            } => OutputRecord::Executed {
                ticker,
                timestamp,
                order_ref,
                size: executed,
                price,
            },
            BookUpdate::Reduced {
                ticker,
                order_ref,
                remaining,
            } => OutputRecord::Reduced {
                ticker,
                timestamp,
                order_ref,
                size_remaining: remaining,
            },
            BookUpdate::Replaced {
                ticker,
                old_order_ref,
                new_order_ref,
                size,
                price,
            } => OutputRecord::Replaced {
                ticker,
                timestamp,
                old_order_ref,
                new_order_ref,
                new_size: size,
                new_price: price,
            },
        }
    }
}
