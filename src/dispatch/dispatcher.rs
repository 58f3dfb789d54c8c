//! src/dispatch/dispatcher.rs
use crate::dispatch::{deliver, plan, Delivery, DispatchConfig, RunAggregator, RunReport, RunRequest};
use crate::domain::Address;
use crate::email::MailRelay;
use futures_util::future::join_all;

/// Runs `request` to completion and reports what happened to every attempted
/// recipient.
///
/// Batches go out strictly one after another, with `config.batch_delay` between
/// them; inside a batch every delivery runs concurrently. Relay failures are
/// recorded in the report, never returned.
#[tracing::instrument(
    name = "Dispatch run",
    skip_all,
    fields(recipients = request.recipients().len())
)]
pub async fn dispatch<R>(request: &RunRequest, config: &DispatchConfig, relay: &R) -> RunReport
where
    R: MailRelay + ?Sized,
{
    let limits = request.limits();
    let plan = plan(request.recipients().to_vec(), limits);

    if plan.skipped > 0 {
        tracing::warn!(
            skipped = plan.skipped,
            "{} emails provided, but only {} will be sent (daily cap)",
            request.recipients().len(),
            limits.daily_cap()
        );
    }

    let mut aggregator = RunAggregator::new(request.recipients().len(), plan.skipped);
    let batch_count = plan.batches.len();

    for (index, batch) in plan.batches.into_iter().enumerate() {
        let deliveries = send_batch(request, config, relay, index + 1, batch).await;
        aggregator.record_all(deliveries);

        if index + 1 < batch_count {
            tokio::time::sleep(config.batch_delay).await;
        }
    }

    let report = aggregator.finish();
    tracing::info!(
        total = report.total,
        attempted = report.attempted,
        sent = report.sent,
        failed = report.failed,
        "Bulk email run completed"
    );

    report
}

#[tracing::instrument(name = "Send batch", skip_all, fields(batch = number, size = batch.len()))]
async fn send_batch<R>(
    request: &RunRequest,
    config: &DispatchConfig,
    relay: &R,
    number: usize,
    batch: Vec<Address>,
) -> Vec<Delivery>
where
    R: MailRelay + ?Sized,
{
    tracing::info!("Sending batch {} ({} emails)", number, batch.len());

    let deliveries = batch.into_iter().map(|address| {
        deliver(
            relay,
            &config.sender,
            request.subject(),
            request.body(),
            address,
        )
    });

    join_all(deliveries).await
}
