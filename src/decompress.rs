use std::io::{self, BufReader, ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::definitions::*;
use crate::{get_varint, masked_checksum, CodecStatus};

/// Reads the Snappy framing format from an inner reader.
///
/// The stream must open with a stream identifier chunk. Padding and reserved
/// skippable chunks are skipped; reserved unskippable chunks fail with
/// [`CodecStatus::UNSUPPORTED`]. Any other malformation, including a checksum
/// mismatch or EOF in the middle of a chunk, fails with
/// [`CodecStatus::CORRUPT_INPUT`]. The status travels inside the returned
/// `io::Error`; see [`Error::from_io`](crate::Error::from_io).
pub struct Decompressor<R: Read> {
    inner: BufReader<R>,
    // Body of the chunk being decoded.
    buf: Vec<u8>,
    decoded: Vec<u8>,
    // decoded[i..j] contains decoded bytes that have not yet been passed on.
    i: usize,
    j: usize,
    read_header: bool,
    verify_checksums: bool,
}

impl<R: Read> Decompressor<R> {
    pub fn new(inner: R) -> Decompressor<R> {
        Decompressor {
            inner: BufReader::new(inner),
            buf: Vec::new(),
            decoded: vec![0; MAX_UNCOMPRESSED_CHUNK_LEN],
            i: 0,
            j: 0,
            read_header: false,
            verify_checksums: true,
        }
    }

    /// Whether chunk checksums are checked against the decoded bytes.
    /// Enabled by default.
    pub fn verify_checksums(mut self, yes: bool) -> Decompressor<R> {
        self.verify_checksums = yes;
        self
    }

    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Unwraps the inner reader. Bytes already buffered from it are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    // Returns false on a clean EOF before the first header byte.
    fn read_chunk_header(&mut self, header: &mut [u8; CHUNK_HEADER_SIZE]) -> io::Result<bool> {
        let mut filled = 0;
        while filled < header.len() {
            match self.inner.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => return Err(corrupt("truncated chunk header")),
                Ok(n) => filled += n,
                Err(ref err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(true)
    }

    // Reads the next chunk_len bytes into self.buf.
    fn fill_chunk(&mut self, chunk_len: usize) -> io::Result<()> {
        self.buf.resize(chunk_len, 0);
        self.inner.read_exact(&mut self.buf[..chunk_len]).map_err(truncated)
    }

    fn skip_chunk(&mut self, chunk_len: usize) -> io::Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(chunk_len as u64), &mut io::sink())?;
        if skipped != chunk_len as u64 {
            return Err(corrupt("truncated skippable chunk"));
        }
        Ok(())
    }

    fn check(&self, expected: u32, n: usize) -> io::Result<()> {
        if self.verify_checksums && masked_checksum(&self.decoded[..n]) != expected {
            return Err(corrupt("checksum mismatch"));
        }
        Ok(())
    }
}

impl<R: Read> Read for Decompressor<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        loop {
            if self.i < self.j {
                let n = dst.len().min(self.j - self.i);
                dst[..n].copy_from_slice(&self.decoded[self.i..self.i + n]);
                self.i += n;
                return Ok(n);
            }

            let mut header = [0u8; CHUNK_HEADER_SIZE];
            if !self.read_chunk_header(&mut header)? {
                return Ok(0);
            }

            let chunk_type = header[0];
            if !self.read_header {
                if chunk_type != CHUNK_TYPE_STREAM_IDENTIFIER {
                    return Err(corrupt("missing stream identifier"));
                }
                self.read_header = true;
            }

            let chunk_len = LittleEndian::read_u24(&header[1..]) as usize;

            // The chunk types are specified at
            // https://github.com/google/snappy/blob/master/framing_format.txt
            match chunk_type {
                // Section 4.2. Compressed data (chunk type 0x00).
                CHUNK_TYPE_COMPRESSED_DATA => {
                    if chunk_len < CHECK_SUM_SIZE {
                        return Err(corrupt("short compressed chunk"));
                    }
                    self.fill_chunk(chunk_len)?;
                    let checksum = LittleEndian::read_u32(&self.buf[..CHECK_SUM_SIZE]);
                    let body = &self.buf[CHECK_SUM_SIZE..];

                    let n = decompressed_len(body)?;
                    if n > self.decoded.len() {
                        return Err(corrupt("chunk exceeds 65536 bytes"));
                    }
                    decompress(&mut self.decoded[..n], body)?;
                    self.check(checksum, n)?;

                    self.i = 0;
                    self.j = n;
                }
                // Section 4.3. Uncompressed data (chunk type 0x01).
                CHUNK_TYPE_UNCOMPRESSED_DATA => {
                    if chunk_len < CHECK_SUM_SIZE {
                        return Err(corrupt("short uncompressed chunk"));
                    }
                    let n = chunk_len - CHECK_SUM_SIZE;
                    if n > self.decoded.len() {
                        return Err(corrupt("chunk exceeds 65536 bytes"));
                    }

                    let mut checksum = [0u8; CHECK_SUM_SIZE];
                    self.inner.read_exact(&mut checksum).map_err(truncated)?;
                    self.inner.read_exact(&mut self.decoded[..n]).map_err(truncated)?;
                    self.check(LittleEndian::read_u32(&checksum), n)?;

                    self.i = 0;
                    self.j = n;
                }
                // Section 4.1. Stream identifier (chunk type 0xff).
                CHUNK_TYPE_STREAM_IDENTIFIER => {
                    if chunk_len != MAGIC_BODY.len() {
                        return Err(corrupt("bad stream identifier length"));
                    }
                    self.fill_chunk(chunk_len)?;
                    if self.buf[..] != MAGIC_BODY {
                        return Err(corrupt("bad stream identifier"));
                    }
                }
                // Section 4.5. Reserved unskippable chunks (chunk types 0x02-0x7f).
                0x02..=0x7f => {
                    debug!("snappy: reserved unskippable chunk type {:#04x}", chunk_type);
                    return Err(io::Error::from(CodecStatus::UNSUPPORTED));
                }
                // Section 4.4 Padding (chunk type 0xfe).
                // Section 4.6. Reserved skippable chunks (chunk types 0x80-0xfd).
                CHUNK_TYPE_PADDING | 0x80..=0xfd => self.skip_chunk(chunk_len)?,
            }
        }
    }
}

fn corrupt(what: &str) -> io::Error {
    debug!("snappy: corrupt framed stream: {}", what);
    io::Error::from(CodecStatus::CORRUPT_INPUT)
}

fn truncated(err: io::Error) -> io::Error {
    if err.kind() == ErrorKind::UnexpectedEof {
        corrupt("truncated chunk body")
    } else {
        err
    }
}

// Reads the block header, returning the decoded length and the header size.
fn decode_header(src: &[u8]) -> Result<(usize, usize), CodecStatus> {
    match get_varint(src) {
        Some((len, n)) if len <= MAX_BLOCK_LEN => {
            let len = usize::try_from(len).map_err(|_| CodecStatus::INPUT_TOO_LARGE)?;
            Ok((len, n))
        }
        _ => Err(CodecStatus::CORRUPT_INPUT),
    }
}

/// Returns the length of the decoded block, read from its header.
pub fn decompressed_len(src: &[u8]) -> Result<usize, CodecStatus> {
    decode_header(src).map(|(len, _)| len)
}

/// Writes the decoded form of `src` into `dst` and returns the length written.
///
/// `dst` must hold at least [`decompressed_len`] bytes, otherwise
/// [`CodecStatus::BUFFER_TOO_SMALL`] is returned. Malformed or truncated
/// input fails with [`CodecStatus::CORRUPT_INPUT`]; `dst` may then hold
/// partial output and must be discarded.
pub fn decompress(dst: &mut [u8], src: &[u8]) -> Result<usize, CodecStatus> {
    let (d_len, mut s) = decode_header(src)?;
    if dst.len() < d_len {
        return Err(CodecStatus::BUFFER_TOO_SMALL);
    }
    let dst = &mut dst[..d_len];
    let mut d = 0;

    while s < src.len() {
        let tag = src[s];
        let (offset, length) = match tag & 0x03 {
            TAG_LITERAL => {
                let mut x = (tag >> 2) as usize;
                if x < 60 {
                    s += 1;
                } else {
                    // The length is stored in the next x - 59 bytes.
                    let extra = x - 59;
                    if s + 1 + extra > src.len() {
                        return Err(CodecStatus::CORRUPT_INPUT);
                    }
                    x = LittleEndian::read_uint(&src[s + 1..], extra) as usize;
                    s += 1 + extra;
                }
                let length = match x.checked_add(1) {
                    Some(length) => length,
                    None => return Err(CodecStatus::CORRUPT_INPUT),
                };
                if length > dst.len() - d || length > src.len() - s {
                    return Err(CodecStatus::CORRUPT_INPUT);
                }
                dst[d..d + length].copy_from_slice(&src[s..s + length]);
                d += length;
                s += length;
                continue;
            }
            TAG_COPY_1 => {
                if s + 2 > src.len() {
                    return Err(CodecStatus::CORRUPT_INPUT);
                }
                let length = 4 + ((tag >> 2) & 0x07) as usize;
                let offset = (((tag & 0xe0) as usize) << 3) | src[s + 1] as usize;
                s += 2;
                (offset, length)
            }
            TAG_COPY_2 => {
                if s + 3 > src.len() {
                    return Err(CodecStatus::CORRUPT_INPUT);
                }
                let length = 1 + (tag >> 2) as usize;
                let offset = LittleEndian::read_u16(&src[s + 1..]) as usize;
                s += 3;
                (offset, length)
            }
            TAG_COPY_4 => {
                if s + 5 > src.len() {
                    return Err(CodecStatus::CORRUPT_INPUT);
                }
                let length = 1 + (tag >> 2) as usize;
                let offset = LittleEndian::read_u32(&src[s + 1..]) as usize;
                s += 5;
                (offset, length)
            }
            _ => unreachable!(),
        };

        if offset == 0 || offset > d || length > dst.len() - d {
            return Err(CodecStatus::CORRUPT_INPUT);
        }
        // Copies may overlap their own output, so go byte by byte.
        for k in d..d + length {
            dst[k] = dst[k - offset];
        }
        d += length;
    }

    if d != d_len {
        return Err(CodecStatus::CORRUPT_INPUT);
    }
    Ok(d)
}
