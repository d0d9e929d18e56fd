//! Feed Normalizer - Order Event Feed Processor
//!
//! Consumes out-of-order UDP packets carrying a sequenced stream of binary
//! order events and writes one normalized record per event. Features include:
//! - Packet resequencing with early-arrival buffering and duplicate discard
//! - Message-boundary detection across packet splits
//! - Per-order state for Execute / Cancel / Replace resolution
//! - Fixed-length little-endian output records with epoch timestamps
//! - Feed statistics and resequencer backlog observability

pub mod protocol;
pub mod packet;
pub mod byte_queue;
pub mod decoder;
pub mod book_builder;
pub mod encoder;
pub mod resequencer;
pub mod processor;
pub mod capture;
pub mod config;
pub mod error;
pub mod stats;

pub use protocol::{MessageType, RecordKind, read_be, write_le};
pub use packet::{Packet, PacketError};
pub use byte_queue::{ByteQueue, InputRecord};
pub use decoder::{Decoder, DecodeError, Message};
pub use book_builder::{OrderBook, Order, BookError, BookUpdate};
pub use encoder::{Encoder, OutputRecord};
pub use resequencer::{Resequencer, Admission};
pub use processor::FeedProcessor;
pub use capture::{PacketReader, PacketWriter};
pub use config::{SessionConfig, SessionDate, TimeBasis, ConfigError};
pub use error::{FeedError, FeedResult};
pub use stats::{FeedStats, LatencyStats};
