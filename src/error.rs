use crate::book_builder::BookError;
use crate::config::ConfigError;
use crate::decoder::DecodeError;
use crate::packet::PacketError;
use thiserror::Error;

/// Any fatal condition surfaced by `FeedProcessor`
///
/// Sequencing anomalies (early or duplicate packets) are not errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("malformed packet: {0}")]
    Packet(#[from] PacketError),

    #[error("message stream desynchronized: {0}")]
    Decode(#[from] DecodeError),

    #[error("unresolved order reference: {0}")]
    Book(#[from] BookError),

    #[error("session configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("output sink: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
