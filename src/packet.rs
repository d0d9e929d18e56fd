//! UDP packet framing
//!
//! Validates the 6-byte header before anything reaches the resequencer.

use crate::protocol::{read_be, PACKET_HEADER_SIZE};
use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet too short: {len} bytes, header needs 6")]
    TooShort { len: usize },

    #[error("packet length mismatch: declared {declared}, buffer holds {actual}")]
    LengthMismatch { declared: u16, actual: usize },

    #[error("payload of {len} bytes does not fit a u16 packet length")]
    TooLong { len: usize },
}

/// A validated view of one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub length: u16,
    pub sequence: u32,
    pub payload: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Validate the header of `raw` and split off the payload
    pub fn parse(raw: &'a [u8]) -> Result<Self, PacketError> {
        if raw.len() < PACKET_HEADER_SIZE {
            return Err(PacketError::TooShort { len: raw.len() });
        }

        let length = read_be(&raw[0..2], 2) as u16;
        if length as usize != raw.len() {
            return Err(PacketError::LengthMismatch {
                declared: length,
                actual: raw.len(),
            });
        }

        Ok(Packet {
            length,
            sequence: read_be(&raw[2..6], 4) as u32,
            payload: &raw[PACKET_HEADER_SIZE..],
        })
    }

    /// Build a raw packet around `payload`
    pub fn encode(sequence: u32, payload: &[u8]) -> Result<Vec<u8>, PacketError> {
        let total = PACKET_HEADER_SIZE + payload.len();
        let length = u16::try_from(total).map_err(|_| PacketError::TooLong { len: payload.len() })?;

        let mut raw = vec![0u8; total];
        BigEndian::write_u16(&mut raw[0..2], length);
        BigEndian::write_u32(&mut raw[2..6], sequence);
        raw[PACKET_HEADER_SIZE..].copy_from_slice(payload);
        Ok(raw)
    }
}
