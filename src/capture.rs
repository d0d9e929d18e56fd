//! Packet capture files
//!
//! A capture is packets stored back to back. Each packet starts with its own
//! big-endian u16 total length, so the file needs no extra framing.

use crate::packet::Packet;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, ErrorKind, Read, Write};

/// Iterates raw packets (header included) out of a capture stream
pub struct PacketReader<R> {
    inner: R,
}

impl<R: Read> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        PacketReader { inner }
    }

    /// Read the next packet; `Ok(None)` at a clean end of stream
    ///
    /// A declared length below 2 yields just the length bytes, which
    /// `Packet::parse` then rejects as too short.
    pub fn read_packet(&mut self) -> io::Result<Option<Vec<u8>>> {
        let length = match self.inner.read_u16::<BigEndian>() {
            Ok(length) => length,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        };

        let total = (length as usize).max(2);
        let mut raw = vec![0u8; total];
        raw[..2].copy_from_slice(&length.to_be_bytes());
        self.inner.read_exact(&mut raw[2..])?;
        Ok(Some(raw))
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_packet().transpose()
    }
}

/// Appends packets to a capture stream
pub struct PacketWriter<W> {
    inner: W,
}

impl<W: Write> PacketWriter<W> {
    pub fn new(inner: W) -> Self {
        PacketWriter { inner }
    }

    /// Frame `payload` under `sequence` and append it
    pub fn write_packet(&mut self, sequence: u32, payload: &[u8]) -> io::Result<()> {
        let raw = Packet::encode(sequence, payload)
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
        self.inner.write_all(&raw)
    }

    /// Append an already framed packet
    pub fn write_raw(&mut self, raw: &[u8]) -> io::Result<()> {
        self.inner.write_all(raw)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
