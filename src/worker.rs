use std::sync::Arc;

use tokio::sync::mpsc;

use crate::limiter::Slot;
use crate::request::request_page_html;
use crate::{Context, Identifier, Outcome};

/// Probes one id and hands exactly one [`Outcome`] to the aggregator.
///
/// The slot is held until the outcome is in the aggregator's channel and released on
/// every path, since it only goes back to the limiter when dropped.
pub(crate) async fn process_id(
    ctx: Arc<Context>,
    id: Identifier,
    slot: Slot,
    result_tx: mpsc::Sender<Outcome>,
) {
    let outcome = probe(&ctx, id).await;

    if let Err(err) = result_tx.send(outcome).await {
        // Only happens if the aggregator is gone; count the id off so the run can finish.
        tracing::error!(id, outcome = ?err.0, "aggregator is gone, outcome dropped");
        ctx.barrier.complete();
    }
    drop(slot);
}

/// Fetches the page for `id` and turns whatever happened into an [`Outcome`].
pub(crate) async fn probe(ctx: &Context, id: Identifier) -> Outcome {
    let url = ctx.config.page_url(id);

    let result = match request_page_html(&ctx.client, &url).await {
        Ok(html) => ctx.extractor.clone().extract(html).await,
        Err(failure) => Err(failure),
    };
    Outcome { id, result }
}
