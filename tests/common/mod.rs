#![allow(dead_code)]

use std::fmt::Write;

/// A serialized log record: newlines, quotes, braces, and punctuation.
pub const LOG_RECORD: &str = r#"1 {
  1: "{file=Queues/QueuesCommand.rs,service=codes.example.application,line=122,function=startJobs(on:),source=Queues}"
  2 {
    1 {
      1: 1668371605
      2: 463043072
    }
    2: "[ERROR] Job run failed: RedisConnectionPoolError(baseError: RediStack.RedisConnectionPoolError.BaseError.timedOutWaitingForConnection)"
  }
}"#;

/// Literal claims three bytes but only one follows.
pub const BAD_TRUNCATED_LITERAL: &[u8] = &[0x05, 0x08, b'a'];

/// Copy reaches back past the start of the output.
pub const BAD_OFFSET: &[u8] = &[0x0a, 0x00, b'a', 0x05, 0x08];

/// Header promises more bytes than the elements produce.
pub const BAD_SHORT_BODY: &[u8] = &[0x10, 0x08, b'a', b'b', b'c'];

/// Length header never terminates.
pub const BAD_HEADER: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Plain text of at least `min_len` bytes with enough repetition to compress.
pub fn text_of_len(min_len: usize) -> String {
    let mut out = String::with_capacity(min_len + 128);
    let mut line = 0u64;
    while out.len() < min_len {
        writeln!(
            out,
            "{:07} It was the best of times, it was the worst of times; entry {} of \"ledger\" {{ok}}",
            line,
            line.wrapping_mul(7919) % 1000
        )
        .unwrap();
        line += 1;
    }
    out
}

/// Deterministic bytes that do not compress.
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}
