use std::io;

use log::{debug, trace};

use crate::{raw, CodecStatus, Error};

const MAX_EXPANSION: usize = 22;

/// Compresses `src` into a new buffer holding exactly the encoded bytes.
///
/// This is the one compression pipeline: every other compression entry point
/// in the crate forwards here. Empty input is valid and encodes to a single
/// header byte.
pub fn compress(src: &[u8]) -> Result<Vec<u8>, Error> {
    trace!("snappy: compressing {} bytes", src.len());

    let mut dst = vec![0; raw::max_compressed_len(src.len())];
    match raw::compress(&mut dst, src) {
        Ok(n) => {
            dst.truncate(n);
            Ok(dst)
        }
        Err(status) => {
            debug!("snappy: compression of {} bytes failed: {}", src.len(), status);
            Err(Error::Codec(status))
        }
    }
}

/// Decompresses `src` into a new buffer sized from its length header.
///
/// This is the one decompression pipeline. An unreadable header fails with
/// [`Error::Sizing`] before anything is allocated; a failed decode drops the
/// partially written buffer and reports [`Error::Codec`].
pub fn uncompress(src: &[u8]) -> Result<Vec<u8>, Error> {
    trace!("snappy: uncompressing {} bytes", src.len());

    let len = raw::decompressed_len(src).map_err(|status| {
        debug!("snappy: cannot read length header: {}", status);
        Error::Sizing(status)
    })?;

    // No element expands by more than 64 bytes out of 3, so a header larger
    // than this cannot be met by the body and the decode would fail anyway.
    if len > src.len().saturating_mul(MAX_EXPANSION) {
        debug!("snappy: header claims {} bytes from {} bytes of input", len, src.len());
        return Err(Error::Codec(CodecStatus::CORRUPT_INPUT));
    }

    let mut dst = vec![0; len];
    match raw::decompress(&mut dst, src) {
        Ok(n) => {
            dst.truncate(n);
            Ok(dst)
        }
        Err(status) => {
            debug!("snappy: decompression of {} bytes failed: {}", src.len(), status);
            Err(Error::Codec(status))
        }
    }
}

/// Snappy compression for byte slices.
///
/// Each direction comes in three flavours over the same pipeline:
/// `*_opt` drops the error, the plain form returns [`Error`], and `*_io`
/// returns an `io::Error` wrapping that same [`Error`].
///
/// ```
/// use snappy_ext::SnappyExt;
///
/// let packed = b"hello hello hello hello".snappy_compress().unwrap();
/// assert_eq!(packed.snappy_uncompress().unwrap(), b"hello hello hello hello");
/// ```
pub trait SnappyExt {
    /// Compresses, yielding `None` on failure.
    fn snappy_compress_opt(&self) -> Option<Vec<u8>>;

    /// Compresses, reporting failure as [`Error::Codec`].
    fn snappy_compress(&self) -> Result<Vec<u8>, Error>;

    /// Compresses for `?` in I/O code. [`Error::from_io`] recovers the status.
    fn snappy_compress_io(&self) -> io::Result<Vec<u8>>;

    /// Decompresses, yielding `None` on failure.
    fn snappy_uncompress_opt(&self) -> Option<Vec<u8>>;

    /// Decompresses, reporting failure as [`Error::Sizing`] or [`Error::Codec`].
    fn snappy_uncompress(&self) -> Result<Vec<u8>, Error>;

    /// Decompresses for `?` in I/O code. [`Error::from_io`] recovers the status.
    ///
    /// ```
    /// use snappy_ext::{CodecStatus, Error, SnappyExt};
    ///
    /// let err = [0x05u8, 0x08, b'a'].snappy_uncompress_io().unwrap_err();
    /// let status = Error::from_io(&err).and_then(Error::status);
    /// assert_eq!(status, Some(CodecStatus::CORRUPT_INPUT));
    /// ```
    fn snappy_uncompress_io(&self) -> io::Result<Vec<u8>>;
}

impl SnappyExt for [u8] {
    fn snappy_compress_opt(&self) -> Option<Vec<u8>> {
        compress(self).ok()
    }

    fn snappy_compress(&self) -> Result<Vec<u8>, Error> {
        compress(self)
    }

    fn snappy_compress_io(&self) -> io::Result<Vec<u8>> {
        Ok(compress(self)?)
    }

    fn snappy_uncompress_opt(&self) -> Option<Vec<u8>> {
        uncompress(self).ok()
    }

    fn snappy_uncompress(&self) -> Result<Vec<u8>, Error> {
        uncompress(self)
    }

    fn snappy_uncompress_io(&self) -> io::Result<Vec<u8>> {
        Ok(uncompress(self)?)
    }
}

// Lets fixed-size arrays such as byte string literals call the trait directly.
impl<const N: usize> SnappyExt for [u8; N] {
    fn snappy_compress_opt(&self) -> Option<Vec<u8>> {
        self[..].snappy_compress_opt()
    }

    fn snappy_compress(&self) -> Result<Vec<u8>, Error> {
        self[..].snappy_compress()
    }

    fn snappy_compress_io(&self) -> io::Result<Vec<u8>> {
        self[..].snappy_compress_io()
    }

    fn snappy_uncompress_opt(&self) -> Option<Vec<u8>> {
        self[..].snappy_uncompress_opt()
    }

    fn snappy_uncompress(&self) -> Result<Vec<u8>, Error> {
        self[..].snappy_uncompress()
    }

    fn snappy_uncompress_io(&self) -> io::Result<Vec<u8>> {
        self[..].snappy_uncompress_io()
    }
}
