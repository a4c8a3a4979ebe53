extern crate snappy_ext;

#[macro_use]
extern crate log;

mod common;

use std::io::{self, Cursor, Read, Write};

use common::*;
use snappy_ext::{CodecStatus, Compressor, Decompressor, Error};

const STREAM_IDENTIFIER: [u8; 10] = [0xff, 0x06, 0x00, 0x00, 0x73, 0x4e, 0x61, 0x50, 0x70, 0x59];

fn frame(data: &[u8]) -> Vec<u8> {
    let mut comp = Compressor::new(Vec::new());
    comp.write_all(data).unwrap();
    comp.finish().unwrap()
}

fn unframe(framed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decomp = Vec::new();
    Decompressor::new(Cursor::new(framed)).read_to_end(&mut decomp)?;
    Ok(decomp)
}

fn status_of(err: &io::Error) -> Option<CodecStatus> {
    Error::from_io(err).and_then(|e| e.status())
}

fn roundtrip(data: &[u8]) {
    init_logger();
    let framed = frame(data);
    debug!("framed {} bytes into {}", data.len(), framed.len());
    assert!(unframe(&framed).unwrap() == data);
}

#[test]
/// Snappy: Roundtrip Uncompressible Data
fn should_do_uncompressible() {
    roundtrip(b"123456789abcdefg");
    roundtrip(b"The quick red fox jumped over the lazy dog");
    roundtrip(&noise(200_000));
}

#[test]
/// Snappy: Roundtrip Compressible Data
fn should_do_compressible() {
    roundtrip(b"1111111100000000");
    roundtrip(LOG_RECORD.as_bytes());
}

#[test]
/// Snappy: Test Empty
fn should_do_empty() {
    let a: [u8; 0] = [];
    roundtrip(&a);
    assert_eq!(frame(&a), STREAM_IDENTIFIER);
}

#[test]
/// Snappy: Roundtrip Large Text Across Chunks
fn should_do_large_text() {
    roundtrip(text_of_len(3 * 65536 + 17).as_bytes());
}

#[test]
/// Snappy: Small Writes and Small Reads
fn should_do_small_writes_and_reads() {
    let data = text_of_len(150_000);

    let mut comp = Compressor::new(Vec::new());
    for piece in data.as_bytes().chunks(333) {
        comp.write_all(piece).unwrap();
    }
    let framed = comp.finish().unwrap();

    let mut decomp = Decompressor::new(Cursor::new(framed));
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let n = decomp.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert!(out == data.as_bytes());
}

#[test]
/// Snappy: Chunk Type Follows Savings
fn should_pick_chunk_type() {
    let framed = frame(&noise(1000));
    assert_eq!(&framed[..10], &STREAM_IDENTIFIER);
    assert_eq!(framed[10], 0x01);

    let framed = frame(&[b'z'; 1000]);
    assert_eq!(framed[10], 0x00);
}

#[test]
/// Snappy: Dropping Flushes Pending Bytes
fn should_flush_on_drop() {
    let mut sink = Vec::new();
    {
        let mut comp = Compressor::new(&mut sink);
        comp.write_all(LOG_RECORD.as_bytes()).unwrap();
    }
    assert_eq!(unframe(&sink).unwrap(), LOG_RECORD.as_bytes());
}

#[test]
/// Snappy: Reject Missing Stream Identifier
fn should_reject_missing_identifier() {
    let framed = frame(b"some bytes");
    let err = unframe(&framed[10..]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(status_of(&err), Some(CodecStatus::CORRUPT_INPUT));
}

#[test]
/// Snappy: Reject Checksum Mismatch
fn should_reject_checksum_mismatch() {
    let mut framed = frame(b"0123456789");
    let last = framed.len() - 1;
    framed[last] ^= 0x01;

    let err = unframe(&framed).unwrap_err();
    assert_eq!(status_of(&err), Some(CodecStatus::CORRUPT_INPUT));

    // With verification off the altered byte comes through.
    let mut decomp = Vec::new();
    Decompressor::new(Cursor::new(&framed))
        .verify_checksums(false)
        .read_to_end(&mut decomp)
        .unwrap();
    assert_eq!(decomp, b"0123456788");
}

#[test]
/// Snappy: Reject Truncated Stream
fn should_reject_truncated() {
    let framed = frame(LOG_RECORD.as_bytes());
    for cut in [framed.len() - 1, 12, 11] {
        let err = unframe(&framed[..cut]).unwrap_err();
        assert_eq!(status_of(&err), Some(CodecStatus::CORRUPT_INPUT), "cut at {}", cut);
    }
}

#[test]
/// Snappy: Reject Unskippable Chunks
fn should_reject_unskippable() {
    let mut framed = STREAM_IDENTIFIER.to_vec();
    framed.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
    let err = unframe(&framed).unwrap_err();
    assert_eq!(status_of(&err), Some(CodecStatus::UNSUPPORTED));
}

#[test]
/// Snappy: Skip Padding and Reserved Skippable Chunks
fn should_skip_padding() {
    let body = frame(b"after the padding");
    let mut framed = STREAM_IDENTIFIER.to_vec();
    framed.extend_from_slice(&[0xfe, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00]);
    framed.extend_from_slice(&[0x80, 0x01, 0x00, 0x00, 0xaa]);
    framed.extend_from_slice(&body[10..]);
    assert_eq!(unframe(&framed).unwrap(), b"after the padding");
}

#[test]
/// Snappy: Concatenated Streams
fn should_do_concatenated_streams() {
    let mut framed = frame(b"first,");
    framed.extend_from_slice(&frame(b"second"));
    assert_eq!(unframe(&framed).unwrap(), b"first,second");
}

#[test]
/// Snappy: Empty Source Reads Nothing
fn should_read_nothing_from_empty_source() {
    assert!(unframe(&[]).unwrap().is_empty());
}
