//! Progress reporting
//!
//! Workers post events into a bounded channel; a single forwarder task
//! drains it and invokes the caller's sink. The sink therefore sees events
//! one at a time, from one task, even while many items copy concurrently.
//! Event order across distinct items is not defined.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bound on queued, not-yet-delivered progress events. Workers await a free
/// slot when the sink falls behind.
const CHANNEL_CAPACITY: usize = 256;

/// A progress update for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Item label: the relative path inside a batch, the file name for a
    /// single copy, or the destination name for a download.
    pub item: String,
    /// Bytes written so far for this item.
    pub bytes_done: u64,
    /// Expected size, when known. `None` means indeterminate (a download
    /// without a Content-Length).
    pub bytes_total: Option<u64>,
}

/// Receiver of progress updates.
///
/// The engine serializes delivery: implementations are never invoked from
/// two tasks at once and do not need their own locking. Implementations
/// should return quickly; slow sinks throttle the transfer through the
/// bounded queue.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Worker-side handle for posting progress events.
///
/// Cloned into every concurrent item task. A reporter without a sink is
/// free: events are dropped without touching a channel.
#[derive(Clone)]
pub(crate) struct Reporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Reporter {
    pub(crate) fn disabled() -> Self {
        Self { tx: None }
    }

    pub(crate) async fn report(&self, item: &str, bytes_done: u64, bytes_total: Option<u64>) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means the forwarder is gone; the
            // transfer itself keeps going.
            let _ = tx
                .send(ProgressEvent {
                    item: item.to_string(),
                    bytes_done,
                    bytes_total,
                })
                .await;
        }
    }
}

/// Single consumer between the workers and the caller's sink.
pub(crate) struct Forwarder {
    handle: Option<JoinHandle<()>>,
}

impl Forwarder {
    /// Spawn the forwarder for `sink`, returning the worker-side reporter.
    ///
    /// With no sink, no task is spawned at all.
    pub(crate) fn spawn(sink: Option<Arc<dyn ProgressSink>>) -> (Reporter, Self) {
        let Some(sink) = sink else {
            return (Reporter::disabled(), Self { handle: None });
        };

        let (tx, mut rx) = mpsc::channel::<ProgressEvent>(CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                sink.on_progress(event);
            }
        });

        (Reporter { tx: Some(tx) }, Self {
            handle: Some(handle),
        })
    }

    /// Wait for all queued events to be delivered.
    ///
    /// Every [`Reporter`] clone must be dropped before calling this, or the
    /// forwarder never observes the channel closing.
    pub(crate) async fn finish(self) {
        if let Some(handle) = self.handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for Recording {
        fn on_progress(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn events_from_concurrent_reporters_all_arrive() {
        let sink = Arc::new(Recording {
            events: Mutex::new(Vec::new()),
        });
        let (reporter, forwarder) = Forwarder::spawn(Some(sink.clone() as Arc<dyn ProgressSink>));

        let mut tasks = Vec::new();
        for worker in 0..4 {
            let reporter = reporter.clone();
            tasks.push(tokio::spawn(async move {
                for step in 0..25u64 {
                    reporter
                        .report(&format!("item-{worker}"), step, Some(25))
                        .await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        drop(reporter);
        forwarder.finish().await;

        assert_eq!(sink.events.lock().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn disabled_reporter_is_a_no_op() {
        let (reporter, forwarder) = Forwarder::spawn(None);
        reporter.report("item", 1, None).await;
        drop(reporter);
        forwarder.finish().await;
    }
}
