//! Async entry points.
//!
//! Each function runs the same pipeline as its synchronous counterpart on
//! tokio's blocking pool and resolves once with that pipeline's outcome. They
//! must be awaited inside a tokio runtime. Inputs are taken by value because
//! the worker may outlive the caller's borrow.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let packed = snappy_ext::task::compress(b"abcabcabcabc".to_vec()).await.unwrap();
//! let plain = snappy_ext::task::uncompress(packed).await.unwrap();
//! assert_eq!(plain, b"abcabcabcabc");
//! # }
//! ```

use log::debug;

use crate::{surface, Error};

/// Runs `f` on the blocking pool and hands back its outcome unchanged.
async fn run_blocking<F>(f: F) -> Result<Vec<u8>, Error>
where
    F: FnOnce() -> Result<Vec<u8>, Error> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => {
            debug!("snappy: blocking worker dropped: {}", err);
            Err(Error::Cancelled)
        }
    }
}

pub async fn compress<T>(src: T) -> Result<Vec<u8>, Error>
where
    T: AsRef<[u8]> + Send + 'static,
{
    run_blocking(move || surface::compress(src.as_ref())).await
}

pub async fn compress_opt<T>(src: T) -> Option<Vec<u8>>
where
    T: AsRef<[u8]> + Send + 'static,
{
    compress(src).await.ok()
}

pub async fn uncompress<T>(src: T) -> Result<Vec<u8>, Error>
where
    T: AsRef<[u8]> + Send + 'static,
{
    run_blocking(move || surface::uncompress(src.as_ref())).await
}

pub async fn uncompress_opt<T>(src: T) -> Option<Vec<u8>>
where
    T: AsRef<[u8]> + Send + 'static,
{
    uncompress(src).await.ok()
}

/// Compresses text through its UTF-8 bytes.
pub async fn compress_text<T>(text: T) -> Result<Vec<u8>, Error>
where
    T: AsRef<str> + Send + 'static,
{
    run_blocking(move || surface::compress(text.as_ref().as_bytes())).await
}

pub async fn compress_text_opt<T>(text: T) -> Option<Vec<u8>>
where
    T: AsRef<str> + Send + 'static,
{
    compress_text(text).await.ok()
}
