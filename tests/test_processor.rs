//! End-to-end tests: packets in, normalized records out

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use feed_normalizer::{
    BookError, DecodeError, FeedError, FeedProcessor, Packet, PacketError, PacketReader,
    PacketWriter,
};
use std::fs::File;
use std::io::{BufReader, Read};

const MIDNIGHT_19700102: u64 = 86_400_000_000_000;

fn add_order(order_ref: u64, size: u32, price: i32) -> Vec<u8> {
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

fn sized_message(tag: u8, order_ref: u64, size: u32) -> Vec<u8> {
    let mut msg = vec![0u8; 21];
    msg[0] = tag;
    BigEndian::write_u64(&mut msg[1..9], 2_123_456_789);
    BigEndian::write_u64(&mut msg[9..17], order_ref);
    BigEndian::write_u32(&mut msg[17..21], size);
    msg
}

fn execute(order_ref: u64, size: u32) -> Vec<u8> {
    sized_message(b'E', order_ref, size)
}

fn cancel(order_ref: u64, size: u32) -> Vec<u8> {
    sized_message(b'X', order_ref, size)
}

fn replace(old_ref: u64, new_ref: u64, size: u32, price: i32) -> Vec<u8> {
    let mut msg = vec![0u8; 33];
    msg[0] = b'R';
    BigEndian::write_u64(&mut msg[1..9], 2_123_456_789);
    BigEndian::write_u64(&mut msg[9..17], old_ref);
    BigEndian::write_u64(&mut msg[17..25], new_ref);
    BigEndian::write_u32(&mut msg[25..29], size);
    BigEndian::write_i32(&mut msg[29..33], price);
    msg
}

fn packet(seq: u32, payload: &[u8]) -> Vec<u8> {
    Packet::encode(seq, payload).unwrap()
}

fn run(packets: &[Vec<u8>]) -> Vec<u8> {
    let mut processor = FeedProcessor::new(MIDNIGHT_19700102, Vec::new());
    for raw in packets {
        processor.on_packet(raw).unwrap();
    }
    processor.into_sink()
}

/// Split an output stream into records using each record's own length field
fn records(out: &[u8]) -> Vec<&[u8]> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < out.len() {
        let len = LittleEndian::read_u16(&out[offset + 2..offset + 4]) as usize;
        records.push(&out[offset..offset + len]);
        offset += len;
    }
    records
}

fn kind(record: &[u8]) -> u16 {
    LittleEndian::read_u16(&record[0..2])
}

fn three_packet_session() -> Vec<Vec<u8>> {
    vec![
        packet(1, &add_order(1, 100, -128)),
        packet(2, &execute(1, 49)),
        packet(3, &cancel(1, 60)),
    ]
}

#[test]
fn test_add_execute_scenario() {
    let out = run(&[packet(1, &add_order(1, 100, -128)), packet(2, &execute(1, 49))]);
    let recs = records(&out);
    assert_eq!(recs.len(), 2);

    let add = recs[0];
    assert_eq!(add.len(), 44);
    assert_eq!(kind(add), 1);
    assert_eq!(LittleEndian::read_u16(&add[2..4]), 44);
    assert_eq!(&add[4..12], b"SPY\0\0\0\0\0");
    assert_eq!(LittleEndian::read_u64(&add[12..20]), 86_401_123_456_789);
    assert_eq!(LittleEndian::read_u64(&add[20..28]), 1);
    assert_eq!(add[28], b'B');
    assert_eq!(&add[29..32], &[0, 0, 0]);
    assert_eq!(LittleEndian::read_u32(&add[32..36]), 100);
    assert_eq!(LittleEndian::read_f64(&add[36..44]), -128.0);

    let exec = recs[1];
    assert_eq!(exec.len(), 40);
    assert_eq!(kind(exec), 2);
    assert_eq!(&exec[4..12], b"SPY\0\0\0\0\0");
    assert_eq!(LittleEndian::read_u64(&exec[12..20]), 86_402_123_456_789);
    assert_eq!(LittleEndian::read_u64(&exec[20..28]), 1);
    assert_eq!(LittleEndian::read_u32(&exec[28..32]), 49);
    assert_eq!(LittleEndian::read_f64(&exec[32..40]), -128.0);
}

#[test]
fn test_cancel_exceeding_size_clamps() {
    let mut processor = FeedProcessor::new(MIDNIGHT_19700102, Vec::new());
    for raw in three_packet_session() {
        processor.on_packet(&raw).unwrap();
    }
    assert_eq!(processor.book().get(1).unwrap().remaining, 0);

    let out = processor.into_sink();
    let recs = records(&out);
    let reduced = recs[2];
    assert_eq!(reduced.len(), 32);
    assert_eq!(kind(reduced), 3);
    assert_eq!(LittleEndian::read_u32(&reduced[28..32]), 0);
}

#[test]
fn test_duplicates_are_idempotent() {
    let once = run(&three_packet_session());

    let session = three_packet_session();
    let twice = run(&[
        session[0].clone(),
        session[0].clone(),
        session[1].clone(),
        session[0].clone(),
        session[2].clone(),
        session[2].clone(),
    ]);
    assert_eq!(once, twice);
}

#[test]
fn test_order_independent_within_gaps() {
    let session = three_packet_session();
    let in_order = run(&session);

    let permutations: [[usize; 3]; 5] = [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for perm in permutations {
        let shuffled: Vec<Vec<u8>> = perm.iter().map(|&i| session[i].clone()).collect();
        assert_eq!(run(&shuffled), in_order, "permutation {:?}", perm);
    }
}

#[test]
fn test_early_packets_produce_nothing_until_gap_closes() {
    let session = three_packet_session();
    let mut processor = FeedProcessor::new(MIDNIGHT_19700102, Vec::new());

    assert_eq!(processor.on_packet(&session[2]).unwrap(), 0);
    assert_eq!(processor.on_packet(&session[1]).unwrap(), 0);
    assert!(processor.sink().is_empty());
    assert_eq!(processor.resequencer().oldest_pending(), Some(2));

    assert_eq!(processor.on_packet(&session[0]).unwrap(), 3);
    assert_eq!(processor.resequencer().pending_len(), 0);
}

#[test]
fn test_message_straddling_packets() {
    let mut stream = add_order(1, 100, -128);
    stream.extend(execute(1, 49));
    let whole = run(&[packet(1, &stream)]);

    for split in [1, 17, 33, 34, 35, 50] {
        let split_run = run(&[packet(1, &stream[..split]), packet(2, &stream[split..])]);
        assert_eq!(split_run, whole, "split at {}", split);
    }

    // Straddling and reordered
    let reordered = run(&[packet(2, &stream[20..]), packet(1, &stream[..20])]);
    assert_eq!(reordered, whole);
}

#[test]
fn test_partial_message_waits_for_next_packet() {
    let msg = add_order(1, 100, 1);
    let mut processor = FeedProcessor::new(0, Vec::new());

    assert_eq!(processor.on_packet(&packet(1, &msg[..10])).unwrap(), 0);
    assert_eq!(processor.buffered_bytes(), 10);
    assert_eq!(processor.on_packet(&packet(2, &msg[10..])).unwrap(), 1);
    assert_eq!(processor.buffered_bytes(), 0);
}

#[test]
fn test_replace_then_execute_new_ref() {
    let out = run(&[
        packet(1, &add_order(1, 100, 1)),
        packet(2, &replace(1, 2, 255, 9)),
        packet(3, &execute(2, 300)),
        packet(4, &cancel(1, 5)),
    ]);
    let recs = records(&out);
    assert_eq!(recs.len(), 4);

    let replaced = recs[1];
    assert_eq!(replaced.len(), 48);
    assert_eq!(kind(replaced), 4);
    assert_eq!(&replaced[4..12], b"SPY\0\0\0\0\0");
    assert_eq!(LittleEndian::read_u64(&replaced[20..28]), 1);
    assert_eq!(LittleEndian::read_u64(&replaced[28..36]), 2);
    assert_eq!(LittleEndian::read_u32(&replaced[36..40]), 255);
    assert_eq!(LittleEndian::read_f64(&replaced[40..48]), 9.0);

    let exec = recs[2];
    assert_eq!(&exec[4..12], b"SPY\0\0\0\0\0");
    assert_eq!(LittleEndian::read_u64(&exec[20..28]), 2);
    assert_eq!(LittleEndian::read_u32(&exec[28..32]), 255);
    assert_eq!(LittleEndian::read_f64(&exec[32..40]), 9.0);

    let reduced = recs[3];
    assert_eq!(LittleEndian::read_u64(&reduced[20..28]), 1);
    assert_eq!(LittleEndian::read_u32(&reduced[28..32]), 0);
}

#[test]
fn test_unresolved_ref_is_fatal_for_that_message() {
    let mut stream = add_order(1, 100, 1);
    stream.extend(execute(9, 10));
    stream.extend(execute(1, 10));

    let mut processor = FeedProcessor::new(0, Vec::new());
    let err = processor.on_packet(&packet(1, &stream)).unwrap_err();
    assert!(matches!(err, FeedError::Book(BookError::OrderNotFound(9))));

    // The add before the failure was written; the execute after it waits
    assert_eq!(records(processor.sink()).len(), 1);
    assert_eq!(processor.buffered_bytes(), 21);

    assert_eq!(processor.drain().unwrap(), 1);
    assert_eq!(processor.book().get(1).unwrap().remaining, 90);
}

#[test]
fn test_unknown_tag_halts_stream() {
    let mut stream = add_order(1, 100, 1);
    stream.push(b'Q');

    let mut processor = FeedProcessor::new(0, Vec::new());
    let err = processor.on_packet(&packet(1, &stream)).unwrap_err();
    assert!(matches!(err, FeedError::Decode(DecodeError::UnknownMessageType(b'Q'))));
    assert_eq!(records(processor.sink()).len(), 1);

    let err = processor.on_packet(&packet(2, &execute(1, 1))).unwrap_err();
    assert!(matches!(err, FeedError::Decode(DecodeError::UnknownMessageType(b'Q'))));
    assert_eq!(records(processor.sink()).len(), 1);
}

#[test]
fn test_malformed_packets_rejected() {
    let mut processor = FeedProcessor::new(0, Vec::new());
    assert!(matches!(
        processor.on_packet(&[0, 5, 0, 0, 0]),
        Err(FeedError::Packet(PacketError::TooShort { len: 5 }))
    ));

    let mut raw = packet(1, &add_order(1, 1, 1));
    raw.pop();
    assert!(matches!(
        processor.on_packet(&raw),
        Err(FeedError::Packet(PacketError::LengthMismatch { declared: 40, actual: 39 }))
    ));

    // Nothing was consumed; sequence 1 is still expected
    assert_eq!(processor.on_packet(&packet(1, &add_order(1, 1, 1))).unwrap(), 1);
}

#[test]
fn test_capture_file_replay() {
    let dir = tempfile::tempdir().unwrap();
    let capture_path = dir.path().join("session.in");
    let output_path = dir.path().join("session.out");

    let session = three_packet_session();
    {
        let mut writer = PacketWriter::new(File::create(&capture_path).unwrap());
        for raw in [&session[1], &session[0], &session[1], &session[2]] {
            writer.write_raw(raw).unwrap();
        }
        writer.flush().unwrap();
    }

    {
        let output = File::create(&output_path).unwrap();
        let mut processor = FeedProcessor::new(MIDNIGHT_19700102, output);
        let reader = PacketReader::new(BufReader::new(File::open(&capture_path).unwrap()));
        for raw in reader {
            processor.on_packet(&raw.unwrap()).unwrap();
        }
        assert_eq!(processor.stats().total_packets(), 4);
        assert_eq!(processor.stats().duplicates(), 1);
        assert_eq!(processor.stats().early_packets(), 1);
        assert_eq!(processor.stats().total_records(), 3);
    }

    let mut written = Vec::new();
    File::open(&output_path).unwrap().read_to_end(&mut written).unwrap();
    assert_eq!(written, run(&session));
    assert_eq!(written.len(), 44 + 40 + 32);
}
