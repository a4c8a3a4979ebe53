use std::fmt;
use std::io;

/// Outcome code reported by the block codec.
///
/// Zero is success; every other value names one failure kind. Codes follow
/// the Linux errno numbering so they read the same as the statuses a C snappy
/// library hands back. The sign is normalized on construction, so `-5` and `5`
/// are the same status, and codes this crate does not define are carried
/// through untouched. `i32::MIN` saturates to `i32::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodecStatus(i32);

impl CodecStatus {
    pub const OK: CodecStatus = CodecStatus(0);
    /// EIO: the compressed input is corrupted or truncated.
    pub const CORRUPT_INPUT: CodecStatus = CodecStatus(5);
    /// EINVAL: the destination buffer is shorter than required.
    pub const BUFFER_TOO_SMALL: CodecStatus = CodecStatus(22);
    /// EFBIG: the source is longer than a block header can describe.
    pub const INPUT_TOO_LARGE: CodecStatus = CodecStatus(27);
    /// EOPNOTSUPP: a framed stream holds a reserved unskippable chunk.
    pub const UNSUPPORTED: CodecStatus = CodecStatus(95);

    pub fn from_raw(code: i32) -> CodecStatus {
        // i32::MIN has no positive twin; it saturates to i32::MAX.
        CodecStatus(code.checked_abs().unwrap_or(i32::MAX))
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub fn description(self) -> &'static str {
        match self {
            CodecStatus::OK => "ok",
            CodecStatus::CORRUPT_INPUT => "corrupt input",
            CodecStatus::BUFFER_TOO_SMALL => "destination buffer is too short",
            CodecStatus::INPUT_TOO_LARGE => "source buffer is too long",
            CodecStatus::UNSUPPORTED => "unsupported input",
            _ => "unknown status",
        }
    }
}

impl From<i32> for CodecStatus {
    fn from(code: i32) -> CodecStatus {
        CodecStatus::from_raw(code)
    }
}

impl fmt::Display for CodecStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "status {} ({})", self.0, self.description())
    }
}

impl std::error::Error for CodecStatus {}

impl From<CodecStatus> for io::Error {
    fn from(status: CodecStatus) -> io::Error {
        io::Error::from(crate::Error::Codec(status))
    }
}
