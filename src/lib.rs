//! Snappy compression for byte buffers and strings.
//!
//! One compression pipeline and one decompression pipeline sit behind every
//! entry point in this crate. They are offered in four shapes:
//!
//! * `Option` for call sites that only care whether it worked
//!   ([`SnappyExt::snappy_compress_opt`]),
//! * `Result<_, Error>` carrying the exact codec status
//!   ([`compress`], [`SnappyExt::snappy_compress`]),
//! * `io::Result` for propagation with `?` through I/O code
//!   ([`SnappyExt::snappy_compress_io`]),
//! * `async` functions that run the work on a blocking worker ([`task`]).
//!
//! The raw block codec lives in [`raw`]. [`Compressor`] and [`Decompressor`]
//! speak the Snappy framing format over any `Write` / `Read`.

// Definitions
mod definitions {

    //
    // Each encoded block begins with the varint-encoded length of the decoded
    // data, followed by a sequence of chunks. Chunks begin and end on byte
    // boundaries. The first byte of each chunk is broken into its 2 least and 6
    // most significant bits called l and m: l ranges in [0, 4) and m ranges in
    // [0, 64). l is the chunk tag. Zero means a literal tag. All other values
    // mean a copy tag.
    //
    // For literal tags:
    // - If m < 60, the next 1 + m bytes are literal bytes.
    // - Otherwise, let n be the little-endian unsigned integer denoted by the
    // next m - 59 bytes. The next 1 + n bytes after that are literal bytes.
    //
    // For copy tags, length bytes are copied from offset bytes ago, in the
    // style of Lempel-Ziv compression algorithms. In particular:
    // - For l == 1, the offset ranges in [0, 1<<11) and the length in [4, 12).
    // The length is 4 + the low 3 bits of m. The high 3 bits of m form bits
    // 8-10 of the offset. The next byte is bits 0-7 of the offset.
    // - For l == 2, the offset ranges in [0, 1<<16) and the length in [1, 65).
    // The length is 1 + m. The offset is the little-endian unsigned integer
    // denoted by the next 2 bytes.
    // - For l == 3, the offset ranges in [0, 1<<32) and the length in [1, 65).
    // The length is 1 + m. The offset is the little-endian unsigned integer
    // denoted by the next 4 bytes.
    //
    pub const TAG_LITERAL: u8 = 0x00;
    pub const TAG_COPY_1: u8 = 0x01;
    pub const TAG_COPY_2: u8 = 0x02;
    pub const TAG_COPY_4: u8 = 0x03;

    // The block header stores the decoded length as a 32-bit value.
    pub const MAX_BLOCK_LEN: u64 = 0xffff_ffff;

    pub const CHECK_SUM_SIZE: usize = 4;
    pub const CHUNK_HEADER_SIZE: usize = 4;
    pub const MAGIC_BODY: [u8; 6] = *b"sNaPpY";
    pub const MAGIC_CHUNK: [u8; 10] = [0xff, 0x06, 0x00, 0x00, 0x73, 0x4e, 0x61, 0x50, 0x70, 0x59];

    // https://github.com/google/snappy/blob/master/framing_format.txt says
    // that "the uncompressed data in a chunk must be no longer than 65536 bytes".
    pub const MAX_UNCOMPRESSED_CHUNK_LEN: usize = 65536;

    pub const CHUNK_TYPE_COMPRESSED_DATA: u8 = 0x00;
    pub const CHUNK_TYPE_UNCOMPRESSED_DATA: u8 = 0x01;
    pub const CHUNK_TYPE_PADDING: u8 = 0xfe;
    pub const CHUNK_TYPE_STREAM_IDENTIFIER: u8 = 0xff;
}

mod error;
mod status;
pub use self::error::Error;
pub use self::status::CodecStatus;

// Snappy Compressor
mod compress;
pub use self::compress::Compressor;

// Snappy Decompressor
mod decompress;
pub use self::decompress::Decompressor;

mod surface;
pub use self::surface::{compress, uncompress, SnappyExt};

pub mod task;
pub mod text;
pub use self::text::SnappyTextExt;

/// The block codec: sizing and one-shot compression into caller buffers.
///
/// `Ok(n)` stands for status zero with `n` bytes written; `Err(status)` is
/// the failure kind.
pub mod raw {
    pub use crate::compress::{compress, max_compressed_len};
    pub use crate::decompress::{decompress, decompressed_len};
}

use crc::{Crc, CRC_32_ISCSI};

const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

// Framed chunks carry a masked CRC-32C of their uncompressed bytes.
fn masked_checksum(data: &[u8]) -> u32 {
    let c = CASTAGNOLI.checksum(data);
    (c >> 15 | c << 17).wrapping_add(0xa282_ead8)
}

// put_varint writes v as an unsigned LEB128 varint and returns the number of
// bytes written.
fn put_varint(dst: &mut [u8], mut v: u64) -> usize {
    let mut i = 0;
    while v >= 0x80 {
        dst[i] = (v as u8) | 0x80;
        v >>= 7;
        i += 1;
    }
    dst[i] = v as u8;
    i + 1
}

// get_varint decodes an unsigned LEB128 varint from the front of src,
// returning the value and the number of bytes read.
fn get_varint(src: &[u8]) -> Option<(u64, usize)> {
    let mut v: u64 = 0;
    for (i, &b) in src.iter().enumerate().take(10) {
        // The tenth byte may only contribute the top bit of a u64.
        if i == 9 && b > 1 {
            return None;
        }
        v |= u64::from(b & 0x7f) << (7 * i);
        if b < 0x80 {
            return Some((v, i + 1));
        }
    }
    None
}
