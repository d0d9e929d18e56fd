//! Synthetic packet capture generator
//!
//! Creates a valid Add/Execute/Cancel/Replace order flow, packetizes it with
//! messages straddling packet boundaries, then shuffles delivery and injects
//! duplicates. Useful for exercising the resequencer and the replay binary.

use byteorder::{BigEndian, ByteOrder};
use feed_normalizer::PacketWriter;
use rand::seq::SliceRandom;
use rand::Rng;
use std::env;
use std::fs::File;
use std::io::BufWriter;

const TICKERS: [&[u8; 8]; 4] = [b"SPY     ", b"QQQ     ", b"AAPL    ", b"BRK A   "];

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/feed_generator.in".to_string()
    };

    let message_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(10000)
    } else {
        10000
    };

    let mut rng = rand::thread_rng();
    let mut next_ref = 1u64;
    let mut live: Vec<u64> = Vec::new();
    let mut stream = Vec::new();

    println!("Generating {} messages to {}", message_count, output_path);

    for i in 0..message_count {
        let timestamp = 34_200_000_000_000u64 + i as u64 * 1_000;
        let msg_type = if live.is_empty() { 0 } else { rng.gen_range(0u8..4) };

        match msg_type {
            0 => {
                let mut msg = [0u8; 34];
                msg[0] = b'A';
                BigEndian::write_u64(&mut msg[1..9], timestamp);
                BigEndian::write_u64(&mut msg[9..17], next_ref);
                msg[17] = if rng.gen_bool(0.5) { b'B' } else { b'S' };
                BigEndian::write_u32(&mut msg[18..22], rng.gen_range(1u32..1000));
                msg[22..30].copy_from_slice(TICKERS[rng.gen_range(0..TICKERS.len())]);
                BigEndian::write_i32(&mut msg[30..34], rng.gen_range(1_000_000i32..3_000_000));
                stream.extend_from_slice(&msg);
                live.push(next_ref);
                next_ref += 1;
            }

            1 | 2 => {
                let mut msg = [0u8; 21];
                msg[0] = if msg_type == 1 { b'E' } else { b'X' };
                BigEndian::write_u64(&mut msg[1..9], timestamp);
                BigEndian::write_u64(&mut msg[9..17], live[rng.gen_range(0..live.len())]);
                BigEndian::write_u32(&mut msg[17..21], rng.gen_range(1u32..500));
                stream.extend_from_slice(&msg);
            }

            _ => {
                let slot = rng.gen_range(0..live.len());
                let mut msg = [0u8; 33];
                msg[0] = b'R';
                BigEndian::write_u64(&mut msg[1..9], timestamp);
                BigEndian::write_u64(&mut msg[9..17], live[slot]);
                BigEndian::write_u64(&mut msg[17..25], next_ref);
                BigEndian::write_u32(&mut msg[25..29], rng.gen_range(1u32..1000));
                BigEndian::write_i32(&mut msg[29..33], rng.gen_range(1_000_000i32..3_000_000));
                stream.extend_from_slice(&msg);
                live[slot] = next_ref;
                next_ref += 1;
            }
        }
    }

    // Cut the stream at arbitrary points so messages straddle packets
    let mut packets: Vec<(u32, &[u8])> = Vec::new();
    let mut offset = 0;
    let mut sequence = 1u32;
    while offset < stream.len() {
        let len = rng.gen_range(1usize..200).min(stream.len() - offset);
        packets.push((sequence, &stream[offset..offset + len]));
        offset += len;
        sequence += 1;
    }

    // Local reordering plus a sprinkling of duplicates
    for window in packets.chunks_mut(8) {
        window.shuffle(&mut rng);
    }
    let duplicates: Vec<(u32, &[u8])> = packets
        .iter()
        .filter(|_| rng.gen_bool(0.05))
        .copied()
        .collect();
    packets.extend(duplicates);

    let mut writer = PacketWriter::new(BufWriter::new(File::create(&output_path)?));
    for (sequence, payload) in &packets {
        writer.write_packet(*sequence, payload)?;
    }
    writer.flush()?;

    println!(
        "Feed generation complete: {} messages, {} packets, {} stream bytes",
        message_count,
        packets.len(),
        stream.len()
    );

    Ok(())
}
