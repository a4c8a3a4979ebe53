use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::CodecStatus;

/// Failure of a compression or decompression call.
///
/// Codec-level variants keep the status exactly as the block codec reported
/// it. Text decoding failures have no status and are never folded into a
/// codec failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The decompressed length could not be read from the block header.
    #[error("snappy: cannot size destination buffer: {0}")]
    Sizing(CodecStatus),

    #[error("snappy: codec failed: {0}")]
    Codec(CodecStatus),

    /// Decompressed bytes were not valid UTF-8.
    #[error("snappy: decompressed bytes are not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    /// The blocking worker was shut down before it produced an outcome.
    #[error("snappy: worker shut down before completing")]
    Cancelled,
}

impl Error {
    /// Status carried by codec-level failures.
    pub fn status(&self) -> Option<CodecStatus> {
        match *self {
            Error::Sizing(status) | Error::Codec(status) => Some(status),
            Error::Encoding(_) | Error::Cancelled => None,
        }
    }

    /// Recovers the `Error` wrapped by `From<Error> for io::Error`.
    pub fn from_io(err: &io::Error) -> Option<&Error> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<Error>())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::Cancelled => io::ErrorKind::Interrupted,
            Error::Sizing(_) | Error::Codec(_) | Error::Encoding(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
