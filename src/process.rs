use std::sync::Arc;

use chrono::Local;
use tokio::{sync::mpsc, task::JoinSet};

use crate::aggregate::{AggregateStats, Aggregator};
use crate::worker::process_id;
use crate::{ids, info_time, Config, Context, Identifier, Outcome, Result};

/// What a finished run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub recorded: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub write_failures: usize,
    /// Workers that panicked before handing over an outcome.
    pub lost: usize,
    pub peak_in_flight: usize,
}

/// Probes every id from `config` and writes the outcomes to `config.result_path`.
pub async fn run(config: Config) -> Result<RunSummary> {
    let ctx = Arc::new(Context::new(config)?);
    run_with(ctx).await
}

/// Like [`run`], with a context the caller keeps a handle to (to inspect the limiter
/// afterwards, for one).
///
/// Returns only once every dispatched id has been counted off the barrier. Opening the
/// result file happens before anything is dispatched.
pub async fn run_with(ctx: Arc<Context>) -> Result<RunSummary> {
    let start_time = Local::now();
    info_time!("Started probing {} ids", ctx.config.max_id);

    let aggregator = Aggregator::create(&ctx.config.result_path).await?;
    let (result_tx, result_rx) = mpsc::channel(ctx.config.result_buffer);
    let collect_handle = tokio::spawn({
        let ctx = ctx.clone();
        async move { aggregator.run(result_rx, &ctx.barrier).await }
    });

    let ids = ids::generate(ctx.config.max_id);
    let dispatched = ids.len();
    ctx.barrier.register(dispatched);

    let lost = dispatch(&ctx, ids, result_tx).await?;
    info_time!(start_time, "Finished dispatching, waiting on the last outcomes.");

    ctx.barrier.wait().await;
    // The channel is closed by now, so the aggregator is on its way out.
    let (file, stats) = collect_handle.await??;
    if let Err(e) = file.sync_all().await {
        tracing::error!("couldn't sync the result file: {e}");
    }

    let AggregateStats {
        recorded,
        succeeded,
        failed,
        write_failures,
    } = stats;
    let summary = RunSummary {
        dispatched,
        recorded,
        succeeded,
        failed,
        write_failures,
        lost,
        peak_in_flight: ctx.limiter.peak_in_flight(),
    };
    info_time!(
        start_time,
        "Wrote the results to file: {}",
        ctx.config.result_path.display()
    );
    Ok(summary)
}

/// Spawns one worker per id, never more than the limiter allows at once. Returns after
/// every worker has finished, with the number of workers that panicked.
async fn dispatch(
    ctx: &Arc<Context>,
    ids: Vec<Identifier>,
    result_tx: mpsc::Sender<Outcome>,
) -> Result<usize> {
    let mut workers = JoinSet::new();
    let mut lost = 0;

    for id in ids {
        // Blocks here once every slot is taken.
        let slot = ctx.limiter.acquire().await?;
        workers.spawn(process_id(ctx.clone(), id, slot, result_tx.clone()));

        while let Some(res) = workers.try_join_next() {
            lost += reap(ctx, res);
        }
    }
    // Workers hold the remaining senders; the channel closes when the last one is done.
    drop(result_tx);

    while let Some(res) = workers.join_next().await {
        lost += reap(ctx, res);
    }
    Ok(lost)
}

fn reap(ctx: &Context, res: core::result::Result<(), tokio::task::JoinError>) -> usize {
    match res {
        Ok(()) => 0,
        Err(e) => {
            // A panicked worker never delivered its outcome.
            tracing::error!("worker task failed: {e}");
            ctx.barrier.complete();
            1
        }
    }
}
