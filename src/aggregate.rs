//! The single writer of the result file.

use std::path::Path;

use chrono::Local;
use tokio::{
    fs::File,
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::barrier::CompletionBarrier;
use crate::{info_time, Error, Outcome, Result, PROGRESS_EVERY};

/// Counts of what went through the aggregator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    /// Outcomes written to the sink.
    pub recorded: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Outcomes that couldn't be encoded or written. They are still counted off the barrier.
    pub write_failures: usize,
}

/// Owns the output for the whole run and appends one JSON line per [`Outcome`],
/// in the order the outcomes arrive.
#[derive(Debug)]
pub struct Aggregator<W> {
    sink: W,
    stats: AggregateStats,
}

impl Aggregator<File> {
    /// Creates (or truncates) the result file. Failing here is fatal for the run.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await.map_err(|source| Error::OpenOutput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin> Aggregator<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            stats: AggregateStats::default(),
        }
    }

    /// Drains `result_rx` until every sender is dropped, completing `barrier` once per
    /// outcome whether or not it could be written. Write errors are counted, never returned.
    pub async fn run(
        mut self,
        mut result_rx: mpsc::Receiver<Outcome>,
        barrier: &CompletionBarrier,
    ) -> Result<(W, AggregateStats)> {
        info_time!("Started collecting outcomes");
        let start_time = Local::now();

        while let Some(outcome) = result_rx.recv().await {
            self.record(&outcome).await;
            barrier.complete();

            if self.stats.recorded % PROGRESS_EVERY == 0 && self.stats.recorded > 0 {
                tracing::info!(
                    recorded = self.stats.recorded,
                    pending = barrier.pending(),
                    "progress"
                );
            }
        }

        if let Err(e) = self.sink.flush().await {
            tracing::error!("final flush error: {e}");
            self.stats.write_failures += 1;
        }
        info_time!(
            start_time,
            "DONE: {} outcomes recorded, {} failed to write",
            self.stats.recorded,
            self.stats.write_failures
        );
        Ok((self.sink, self.stats))
    }

    async fn record(&mut self, outcome: &Outcome) {
        tracing::debug!(id = outcome.id, result = ?outcome.result, "process result");

        let line = match outcome.encode() {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(id = outcome.id, "encode json error: {e}");
                self.stats.write_failures += 1;
                return;
            }
        };
        // A file sink only reports a failed write on the next call, so flush each record to
        // pin any error on the record that caused it.
        let written = match self.sink.write_all(&line).await {
            Ok(()) => self.sink.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::error!(id = outcome.id, "write error: {e}");
            self.stats.write_failures += 1;
            return;
        }

        self.stats.recorded += 1;
        if outcome.is_success() {
            self.stats.succeeded += 1;
        } else {
            self.stats.failed += 1;
        }
    }
}
