//! Wire formats for the inbound packet feed and the outbound record stream
//!
//! Inbound packets: [length: u16 BE][sequence: u32 BE][payload...]
//! The payload is a slice of a continuous stream of fixed-length messages,
//! each starting with a one-byte ASCII tag. All inbound integers are big-endian.
//!
//! Outbound records: [kind: u16 LE][length: u16 LE][body...]
//! All outbound integers and doubles are little-endian.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Packet header: total length (2) + sequence number (4)
pub const PACKET_HEADER_SIZE: usize = 6;

pub const TICKER_LEN: usize = 8;

pub const ADD_ORDER_LEN: usize = 34;
pub const ORDER_EXECUTED_LEN: usize = 21;
pub const ORDER_CANCELLED_LEN: usize = 21;
pub const ORDER_REPLACED_LEN: usize = 33;

pub const ADDED_RECORD_LEN: usize = 44;
pub const EXECUTED_RECORD_LEN: usize = 40;
pub const REDUCED_RECORD_LEN: usize = 32;
pub const REPLACED_RECORD_LEN: usize = 48;

/// Inbound message tag, the first byte of every input record
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    AddOrder = b'A',
    OrderExecuted = b'E',
    OrderCancelled = b'X',
    OrderReplaced = b'R',
}

impl MessageType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            b'A' => Some(MessageType::AddOrder),
            b'E' => Some(MessageType::OrderExecuted),
            b'X' => Some(MessageType::OrderCancelled),
            b'R' => Some(MessageType::OrderReplaced),
            _ => None,
        }
    }

    /// Total input record length, tag byte included
    pub fn record_len(self) -> usize {
        match self {
            MessageType::AddOrder => ADD_ORDER_LEN,
            MessageType::OrderExecuted => ORDER_EXECUTED_LEN,
            MessageType::OrderCancelled => ORDER_CANCELLED_LEN,
            MessageType::OrderReplaced => ORDER_REPLACED_LEN,
        }
    }
}

/// Outbound record kind, written as the first two bytes of every output record
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Added = 1,
    Executed = 2,
    Reduced = 3,
    Replaced = 4,
}

impl RecordKind {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(RecordKind::Added),
            2 => Some(RecordKind::Executed),
            3 => Some(RecordKind::Reduced),
            4 => Some(RecordKind::Replaced),
            _ => None,
        }
    }

    pub fn record_len(self) -> usize {
        match self {
            RecordKind::Added => ADDED_RECORD_LEN,
            RecordKind::Executed => EXECUTED_RECORD_LEN,
            RecordKind::Reduced => REDUCED_RECORD_LEN,
            RecordKind::Replaced => REPLACED_RECORD_LEN,
        }
    }
}

/// Read an unsigned big-endian integer of `width` bytes (1..=8) from the front of `bytes`
///
/// The most significant byte is shifted by `8 * (width - 1)`, i.e. 56 for a u64.
pub fn read_be(bytes: &[u8], width: usize) -> u64 {
    BigEndian::read_uint(&bytes[..width], width)
}

/// Write the low `width` bytes (1..=8) of `value` little-endian into the front of `buf`
pub fn write_le(buf: &mut [u8], value: u64, width: usize) {
    LittleEndian::write_uint(&mut buf[..width], value, width)
}

/// Convert a raw signed price field to a double
///
/// No tick scaling is applied: a raw value of -128 becomes -128.0.
pub fn price_from_raw(raw: i32) -> f64 {
    f64::from(raw)
}

/// Replace spaces in an inbound ticker with NUL bytes
pub fn normalize_ticker(raw: [u8; TICKER_LEN]) -> [u8; TICKER_LEN] {
    raw.map(|c| if c == b' ' { 0 } else { c })
}
