//! In-sequence payload buffer and message-boundary detection
//!
//! Payload bytes land here only after the resequencer has put them in order.
//! Messages may straddle packet boundaries, so a partial message simply waits
//! for the next append.

use crate::decoder::DecodeError;
use crate::protocol::MessageType;
use std::collections::VecDeque;

/// One complete input message popped off the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub message_type: MessageType,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ByteQueue {
    bytes: VecDeque<u8>,
}

impl ByteQueue {
    pub fn new() -> Self {
        ByteQueue {
            bytes: VecDeque::new(),
        }
    }

    pub fn extend(&mut self, payload: &[u8]) {
        self.bytes.extend(payload.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy out the buffered bytes, front first
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().copied().collect()
    }

    /// Peek the tag of the message at the front of the queue
    pub fn front_tag(&self) -> Option<u8> {
        self.bytes.front().copied()
    }

    /// Pop the next complete message, if one is buffered
    ///
    /// Returns `Ok(None)` when the queue is empty or holds only part of the
    /// front message. An unknown tag is left in place: lengths depend on the
    /// tag, so there is no way to skip past it.
    pub fn next_record(&mut self) -> Result<Option<InputRecord>, DecodeError> {
        let Some(tag) = self.front_tag() else {
            return Ok(None);
        };

        let message_type =
            MessageType::from_u8(tag).ok_or(DecodeError::UnknownMessageType(tag))?;

        let len = message_type.record_len();
        if self.bytes.len() < len {
            return Ok(None);
        }

        let bytes: Vec<u8> = self.bytes.drain(..len).collect();
        Ok(Some(InputRecord {
            message_type,
            bytes,
        }))
    }
}
