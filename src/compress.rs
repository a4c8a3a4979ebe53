use std::io::{self, BufWriter, ErrorKind, Write};

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::definitions::*;
use crate::{masked_checksum, put_varint, CodecStatus};

// We limit how far copy back-references can go, the same as the C++ code.
const MAX_OFFSET: usize = 1 << 15;

// The hash table size ranges from 1<<8 to 1<<14 inclusive.
const MIN_TABLE_SIZE: usize = 1 << 8;
const MAX_TABLE_SIZE: usize = 1 << 14;

/// Writes the Snappy framing format to an inner writer.
///
/// Input is collected into chunks of 64 KiB. A chunk is stored compressed only
/// when that saves at least 12.5%, otherwise it is stored as-is. Call
/// [`flush`](Write::flush) or [`finish`](Compressor::finish) to push out a
/// partial chunk; dropping the compressor flushes on a best-effort basis and
/// ignores errors.
pub struct Compressor<W: Write> {
    inner: Option<BufWriter<W>>,
    // Uncompressed bytes not yet emitted as a chunk.
    pending: Vec<u8>,
    scratch: Vec<u8>,
    wrote_header: bool,
}

impl<W: Write> Compressor<W> {
    pub fn new(inner: W) -> Compressor<W> {
        Compressor {
            inner: Some(BufWriter::new(inner)),
            pending: Vec::with_capacity(MAX_UNCOMPRESSED_CHUNK_LEN),
            scratch: vec![0; max_compressed_len(MAX_UNCOMPRESSED_CHUNK_LEN)],
            wrote_header: false,
        }
    }

    /// Emits any partial chunk, flushes, and hands back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        match self.inner.take() {
            Some(sink) => sink.into_inner().map_err(|err| err.into_error()),
            None => Err(finished()),
        }
    }

    // Writes the stream identifier if needed, then the pending bytes as one
    // chunk.
    fn emit_chunk(&mut self) -> io::Result<()> {
        let sink = match self.inner.as_mut() {
            Some(sink) => sink,
            None => return Err(finished()),
        };

        if !self.wrote_header {
            sink.write_all(&MAGIC_CHUNK)?;
            self.wrote_header = true;
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        let src = &self.pending[..];
        let checksum = masked_checksum(src);

        // Compress the buffer, discarding the result if the improvement
        // isn't at least 12.5%.
        let n = compress(&mut self.scratch, src)?;
        let (chunk_type, chunk_body) = if n >= src.len() - src.len() / 8 {
            (CHUNK_TYPE_UNCOMPRESSED_DATA, src)
        } else {
            (CHUNK_TYPE_COMPRESSED_DATA, &self.scratch[..n])
        };
        trace!(
            "snappy: emitting chunk type {:#04x}, {} -> {} bytes",
            chunk_type,
            src.len(),
            chunk_body.len()
        );

        let mut header = [0u8; CHUNK_HEADER_SIZE + CHECK_SUM_SIZE];
        header[0] = chunk_type;
        LittleEndian::write_u24(&mut header[1..4], (chunk_body.len() + CHECK_SUM_SIZE) as u32);
        LittleEndian::write_u32(&mut header[4..], checksum);

        sink.write_all(&header)?;
        sink.write_all(chunk_body)?;

        self.pending.clear();
        Ok(())
    }
}

impl<W: Write> Write for Compressor<W> {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        // A full chunk goes out before more input is accepted, so a failed
        // emit never leaves bytes both accepted and lost.
        if self.pending.len() == MAX_UNCOMPRESSED_CHUNK_LEN {
            self.emit_chunk()?;
        }
        let n = src.len().min(MAX_UNCOMPRESSED_CHUNK_LEN - self.pending.len());
        self.pending.extend_from_slice(&src[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_chunk()?;
        match self.inner.as_mut() {
            Some(sink) => sink.flush(),
            None => Err(finished()),
        }
    }
}

impl<W: Write> Drop for Compressor<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.flush();
        }
    }
}

fn finished() -> io::Error {
    io::Error::new(ErrorKind::Other, "snappy: compressor already finished")
}

/// Writes the encoded form of `src` into `dst` and returns the length written.
///
/// `dst` must hold at least [`max_compressed_len`] bytes for `src`, otherwise
/// [`CodecStatus::BUFFER_TOO_SMALL`] is returned. Sources longer than
/// `u32::MAX` bytes fail with [`CodecStatus::INPUT_TOO_LARGE`].
pub fn compress(dst: &mut [u8], src: &[u8]) -> Result<usize, CodecStatus> {
    if src.len() as u64 > MAX_BLOCK_LEN {
        return Err(CodecStatus::INPUT_TOO_LARGE);
    }
    if dst.len() < max_compressed_len(src.len()) {
        return Err(CodecStatus::BUFFER_TOO_SMALL);
    }

    // Start Block with varint-encoded length of decompressed bytes
    let mut d = put_varint(dst, src.len() as u64);

    // Return early if src is short
    if src.len() <= 4 {
        if !src.is_empty() {
            d += emit_literal(&mut dst[d..], src);
        }
        return Ok(d);
    }

    let mut shift: u32 = 24;
    let mut table_size = MIN_TABLE_SIZE;
    while table_size < MAX_TABLE_SIZE && table_size < src.len() {
        shift -= 1;
        table_size *= 2;
    }

    // Entries hold position + 1 so that zero can mean "empty".
    let mut table = vec![0usize; table_size];

    let mut s = 0;
    let mut lit = 0;

    while s + 3 < src.len() {
        let b = LittleEndian::read_u32(&src[s..]);
        let slot = &mut table[(b.wrapping_mul(0x1e35_a7bd) >> shift) as usize];
        let candidate = *slot;
        *slot = s + 1;

        // If there is no candidate, it is too far back, or src[t..t+4] differs
        // from src[s..s+4], accumulate a literal byte.
        if candidate == 0 {
            s += 1;
            continue;
        }
        let mut t = candidate - 1;
        if s - t >= MAX_OFFSET || b != LittleEndian::read_u32(&src[t..]) {
            s += 1;
            continue;
        }

        // Otherwise, we have a match. First, emit any pending literal bytes.
        if lit != s {
            d += emit_literal(&mut dst[d..], &src[lit..s]);
        }

        // Extend the match to be as long as possible.
        let s0 = s;
        s += 4;
        t += 4;
        while s < src.len() && src[s] == src[t] {
            s += 1;
            t += 1;
        }

        d += emit_copy(&mut dst[d..], s - t, s - s0);
        lit = s;
    }

    // Emit any final pending literal bytes and return.
    if lit != src.len() {
        d += emit_literal(&mut dst[d..], &src[lit..]);
    }

    Ok(d)
}

// emit_literal writes a literal chunk and returns the number of bytes written.
// lit is non-empty and no longer than MAX_BLOCK_LEN.
fn emit_literal(dst: &mut [u8], lit: &[u8]) -> usize {
    let n = (lit.len() - 1) as u32;

    let i = if n < 60 {
        dst[0] = (n as u8) << 2 | TAG_LITERAL;
        1
    } else if n < 1 << 8 {
        dst[0] = 60 << 2 | TAG_LITERAL;
        dst[1] = n as u8;
        2
    } else if n < 1 << 16 {
        dst[0] = 61 << 2 | TAG_LITERAL;
        LittleEndian::write_u16(&mut dst[1..], n as u16);
        3
    } else if n < 1 << 24 {
        dst[0] = 62 << 2 | TAG_LITERAL;
        LittleEndian::write_u24(&mut dst[1..], n);
        4
    } else {
        dst[0] = 63 << 2 | TAG_LITERAL;
        LittleEndian::write_u32(&mut dst[1..], n);
        5
    };

    dst[i..i + lit.len()].copy_from_slice(lit);
    i + lit.len()
}

// emit_copy writes a copy chunk and returns the number of bytes written.
// offset is in (0, MAX_OFFSET) and length is at least 4.
fn emit_copy(dst: &mut [u8], offset: usize, mut length: usize) -> usize {
    let mut i = 0;

    while length > 0 {
        if (4..12).contains(&length) && offset < 1 << 11 {
            dst[i] = (((offset >> 8) as u8) & 0x07) << 5 | ((length - 4) as u8) << 2 | TAG_COPY_1;
            dst[i + 1] = offset as u8;
            i += 2;
            break;
        }
        let x = length.min(1 << 6);
        dst[i] = ((x - 1) as u8) << 2 | TAG_COPY_2;
        LittleEndian::write_u16(&mut dst[i + 1..], offset as u16);
        i += 3;
        length -= x;
    }
    i
}

/// Returns the maximum length of a snappy block, given its uncompressed
/// length.
pub fn max_compressed_len(src_len: usize) -> usize {
    32 + src_len + src_len / 6
}
