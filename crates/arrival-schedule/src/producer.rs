//! Offset producer — runs a schedule ahead of the pacer in a tokio task.
//!
//! The producer pushes entries into a bounded channel, so it never gets
//! more than `buffer` entries ahead of the consumer. It exits as soon as
//! the schedule ends, the shutdown signal flips, or the receiver is
//! dropped.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Resolve once `shutdown` holds `true`.
///
/// A dropped sender can never signal, so this then waits forever.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|&stop| stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Spawn a task that feeds `schedule` into a bounded channel.
///
/// The returned handle resolves to the number of entries delivered.
pub fn spawn_producer<I>(
    schedule: I,
    buffer: usize,
    mut shutdown: watch::Receiver<bool>,
) -> (mpsc::Receiver<I::Item>, JoinHandle<u64>)
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let handle = tokio::spawn(async move {
        let mut sent = 0u64;
        for entry in schedule {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                permit = tx.reserve() => match permit {
                    Ok(permit) => {
                        permit.send(entry);
                        sent += 1;
                    }
                    Err(_) => break,
                },
            }
        }
        debug!(sent, "schedule producer finished");
        sent
    });

    (rx, handle)
}
