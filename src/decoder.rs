//! Input record decoder
//!
//! Turns one fixed-length record popped from the byte queue into an owned
//! `Message`. Decoding is pure: no order state is consulted here.

use crate::byte_queue::InputRecord;
use crate::protocol::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected message type: {0:#04x}")]
    UnknownMessageType(u8),

    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Timestamps are nanoseconds since midnight of the session date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    AddOrder {
        timestamp: u64,
        order_ref: u64,
        side: u8,
        size: u32,
        ticker: [u8; TICKER_LEN],
        price: f64,
    },
    OrderExecuted {
        timestamp: u64,
        order_ref: u64,
        size: u32,
    },
    OrderCancelled {
        timestamp: u64,
        order_ref: u64,
        size: u32,
    },
    OrderReplaced {
        timestamp: u64,
        old_order_ref: u64,
        new_order_ref: u64,
        size: u32,
        price: f64,
    },
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::AddOrder { .. } => MessageType::AddOrder,
            Message::OrderExecuted { .. } => MessageType::OrderExecuted,
            Message::OrderCancelled { .. } => MessageType::OrderCancelled,
            Message::OrderReplaced { .. } => MessageType::OrderReplaced,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match *self {
            Message::AddOrder { timestamp, .. }
            | Message::OrderExecuted { timestamp, .. }
            | Message::OrderCancelled { timestamp, .. }
            | Message::OrderReplaced { timestamp, .. } => timestamp,
        }
    }
}

pub struct Decoder;

impl Decoder {
    /// Decode a record popped by `ByteQueue::next_record`
    pub fn decode_record(record: &InputRecord) -> DecodeResult<Message> {
        Self::decode(&record.bytes)
    }

    /// Decode one message from the front of `buffer`
    ///
    /// `buffer[0]` is the tag; at least the tag's full record length must be present.
    pub fn decode(buffer: &[u8]) -> DecodeResult<Message> {
        let tag = *buffer.first().ok_or(DecodeError::BufferTooSmall { need: 1, have: 0 })?;
        let message_type = MessageType::from_u8(tag).ok_or(DecodeError::UnknownMessageType(tag))?;

        let need = message_type.record_len();
        if buffer.len() < need {
            return Err(DecodeError::BufferTooSmall {
                need,
                have: buffer.len(),
            });
        }

        let timestamp = read_be(&buffer[1..], 8);

        let msg = match message_type {
            MessageType::AddOrder => {
                let mut ticker = [0u8; TICKER_LEN];
                ticker.copy_from_slice(&buffer[22..30]);
                Message::AddOrder {
                    timestamp,
                    order_ref: read_be(&buffer[9..], 8),
                    side: buffer[17],
                    size: read_be(&buffer[18..], 4) as u32,
                    ticker,
                    price: price_from_raw(read_be(&buffer[30..], 4) as u32 as i32),
                }
            }
            MessageType::OrderExecuted => Message::OrderExecuted {
                timestamp,
                order_ref: read_be(&buffer[9..], 8),
                size: read_be(&buffer[17..], 4) as u32,
            },
            MessageType::OrderCancelled => Message::OrderCancelled {
                timestamp,
                order_ref: read_be(&buffer[9..], 8),
                size: read_be(&buffer[17..], 4) as u32,
            },
            MessageType::OrderReplaced => Message::OrderReplaced {
                timestamp,
                old_order_ref: read_be(&buffer[9..], 8),
                new_order_ref: read_be(&buffer[17..], 8),
                size: read_be(&buffer[25..], 4) as u32,
                price: price_from_raw(read_be(&buffer[29..], 4) as u32 as i32),
            },
        };

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, ByteOrder};

    fn create_add_order_msg(order_ref: u64, size: u32, price: i32) -> Vec<u8> {
        let mut msg = vec![0u8; 34];
        msg[0] = b'A';
        BigEndian::write_u64(&mut msg[1..9], 1_123_456_789);
        BigEndian::write_u64(&mut msg[9..17], order_ref);
        msg[17] = b'B';
        BigEndian::write_u32(&mut msg[18..22], size);
        msg[22..30].copy_from_slice(b"SPY     ");
        BigEndian::write_i32(&mut msg[30..34], price);
        msg
    }

    #[test]
    fn test_decode_add_order() {
        let msg = create_add_order_msg(42, 100, -128);
        let decoded = Decoder::decode(&msg).unwrap();
        assert_eq!(decoded.message_type(), MessageType::AddOrder);
        assert_eq!(decoded.timestamp(), 1_123_456_789);
        match decoded {
            Message::AddOrder { order_ref, side, size, ticker, price, .. } => {
                assert_eq!(order_ref, 42);
                assert_eq!(side, b'B');
                assert_eq!(size, 100);
                // Ticker is normalized when stored, not when decoded
                assert_eq!(&ticker, b"SPY     ");
                assert_eq!(price, -128.0);
            }
            _ => panic!("Expected add order"),
        }
    }

    #[test]
    fn test_decode_large_order_ref() {
        let msg = create_add_order_msg(0xABCD_0000_0000_0001, 1, 1);
        match Decoder::decode(&msg).unwrap() {
            Message::AddOrder { order_ref, .. } => assert_eq!(order_ref, 0xABCD_0000_0000_0001),
            _ => panic!("Expected add order"),
        }
    }

    #[test]
    fn test_buffer_too_small() {
        let msg = create_add_order_msg(1, 1, 1);
        let result = Decoder::decode(&msg[..20]);
        assert_eq!(result, Err(DecodeError::BufferTooSmall { need: 34, have: 20 }));
    }

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(
            Decoder::decode(&[]),
            Err(DecodeError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_invalid_message_type() {
        let msg = vec![b'Z'; 40];
        assert_eq!(Decoder::decode(&msg), Err(DecodeError::UnknownMessageType(b'Z')));
    }
}
