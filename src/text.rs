//! Text on top of the byte pipelines.
//!
//! Strings are compressed through their UTF-8 bytes. Decompression always
//! produces bytes; turning them back into a `String` is the separate
//! [`decode`] step, whose failure is [`Error::Encoding`] and never a codec
//! status.

use std::io;

use crate::{surface, Error};

/// Snappy compression for string slices, encoded as UTF-8.
///
/// A `str` is valid UTF-8 by construction, so the only failures are the
/// codec's own.
pub trait SnappyTextExt {
    /// Compresses the UTF-8 bytes, yielding `None` on failure.
    fn snappy_compress_opt(&self) -> Option<Vec<u8>>;

    /// Compresses the UTF-8 bytes, reporting failure as [`Error::Codec`].
    fn snappy_compress(&self) -> Result<Vec<u8>, Error>;

    /// Compresses for `?` in I/O code. [`Error::from_io`] recovers the status.
    fn snappy_compress_io(&self) -> io::Result<Vec<u8>>;
}

impl SnappyTextExt for str {
    fn snappy_compress_opt(&self) -> Option<Vec<u8>> {
        surface::compress(self.as_bytes()).ok()
    }

    fn snappy_compress(&self) -> Result<Vec<u8>, Error> {
        surface::compress(self.as_bytes())
    }

    fn snappy_compress_io(&self) -> io::Result<Vec<u8>> {
        Ok(surface::compress(self.as_bytes())?)
    }
}

/// Decodes decompressed bytes as UTF-8 without copying them.
pub fn decode(bytes: Vec<u8>) -> Result<String, Error> {
    Ok(String::from_utf8(bytes)?)
}

/// Decompresses `src` and decodes the result as UTF-8.
pub fn uncompress_to_string(src: &[u8]) -> Result<String, Error> {
    decode(surface::uncompress(src)?)
}
