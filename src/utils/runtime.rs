use anyhow::Result;

/// Everything in habitlog runs on one thread. Storage calls are the only points where work
/// suspends.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
