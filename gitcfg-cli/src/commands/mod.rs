//! CLI command implementations

pub mod adapt;
pub mod inspect;
pub mod sync;

pub use adapt::AdaptArgs;
pub use inspect::InspectArgs;
pub use sync::{ResolveArgs, SyncArgs};

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

/// Read adapter input from a file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read adapter input from stdin")?;
        return Ok(body);
    }

    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Run blocking git work off the async runtime, bounded by `timeout`
///
/// A timed-out call keeps running in the background; the next synchronization
/// of the same path recovers whatever it leaves behind.
pub(crate) async fn run_blocking<T, F>(timeout: Option<Duration>, work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> gitcfg_core::Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            tracing::warn!(seconds = limit.as_secs(), "Synchronization timed out");
            anyhow::anyhow!("Synchronization did not finish within {}s", limit.as_secs())
        })?,
        None => task.await,
    };

    Ok(joined.context("Synchronization task panicked")??)
}
