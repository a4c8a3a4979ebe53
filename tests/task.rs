mod common;

use std::thread;

use common::*;
use snappy_ext::{task, text, CodecStatus, Error, SnappyExt};

#[tokio::test]
/// Snappy: Async Roundtrip
async fn should_roundtrip_async() {
    init_logger();
    let packed = task::compress(LOG_RECORD).await.unwrap();
    let plain = task::uncompress(packed).await.unwrap();
    assert_eq!(text::decode(plain).unwrap(), LOG_RECORD);
}

#[tokio::test]
/// Snappy: Async Text
async fn should_compress_text_async() {
    let packed = task::compress_text(String::from(LOG_RECORD)).await.unwrap();
    assert_eq!(text::uncompress_to_string(&packed).unwrap(), LOG_RECORD);
    assert_eq!(task::compress_text_opt(LOG_RECORD).await, Some(packed));
}

#[tokio::test]
/// Snappy: Async Corrupted Input
async fn should_fail_async() {
    let err = task::uncompress(BAD_OFFSET).await.unwrap_err();
    assert_eq!(err, Error::Codec(CodecStatus::CORRUPT_INPUT));
    assert_eq!(task::uncompress_opt(BAD_OFFSET).await, None);

    let err = task::uncompress(BAD_HEADER).await.unwrap_err();
    assert_eq!(err, Error::Sizing(CodecStatus::CORRUPT_INPUT));
}

#[tokio::test(flavor = "current_thread")]
/// Snappy: Async On A Single-Threaded Runtime
async fn should_run_on_current_thread() {
    let data = text_of_len(200_000);
    let packed = task::compress(data.clone()).await.unwrap();
    assert_eq!(task::uncompress(packed).await.unwrap(), data.as_bytes());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
/// Snappy: Concurrent Async and Sync Callers Agree
async fn should_agree_under_concurrency() {
    init_logger();
    let inputs: Vec<Vec<u8>> = (0..8)
        .map(|i| {
            if i % 2 == 0 {
                text_of_len(100_000 + i * 1000).into_bytes()
            } else {
                noise(50_000 + i * 1000)
            }
        })
        .collect();
    let expected: Vec<Vec<u8>> = inputs.iter().map(|input| input.snappy_compress().unwrap()).collect();

    let async_callers: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|input| tokio::spawn(async move { task::compress(input).await }))
        .collect();
    let sync_callers: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|input| thread::spawn(move || input.snappy_compress()))
        .collect();

    for (caller, want) in async_callers.into_iter().zip(&expected) {
        assert_eq!(&caller.await.unwrap().unwrap(), want);
    }
    for (caller, want) in sync_callers.into_iter().zip(&expected) {
        assert_eq!(&caller.join().unwrap().unwrap(), want);
    }

    let roundtrips: Vec<_> = expected
        .iter()
        .cloned()
        .map(|packed| tokio::spawn(task::uncompress(packed)))
        .collect();
    for (caller, input) in roundtrips.into_iter().zip(&inputs) {
        assert_eq!(&caller.await.unwrap().unwrap(), input);
    }
}
