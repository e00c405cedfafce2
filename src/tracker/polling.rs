use crate::tracker::Tracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Sleep for `period` unless `shutdown` fires first. Returns `true` when the
/// full period elapsed and `false` on cancellation.
pub async fn wait_or_cancel(shutdown: &CancellationToken, period: Duration) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = sleep(period) => true,
    }
}

/// Run a cycle immediately, then one per poll interval until `shutdown` is
/// cancelled. A cycle that has started always runs to completion.
pub async fn start_polling(tracker: Arc<Tracker>, shutdown: CancellationToken) {
    let period = tracker.settings().poll_interval;
    info!("Starting treasury tracker, poll interval: {:?}", period);

    loop {
        match tracker.run_cycle().await {
            Ok(report) => info!(
                wallets = report.wallets_processed,
                up_to_date = report.wallets_up_to_date,
                balances = report.balances_written,
                fetched = report.transfers_fetched,
                inserted = report.transfers_inserted,
                duplicates = report.transfers_duplicate,
                skipped = report.skipped.len(),
                "Completed wallet updates"
            ),
            Err(e) => error!("Error during wallet updates: {}", e.report()),
        }

        if !wait_or_cancel(&shutdown, period).await {
            info!("Shutting down treasury tracker");
            break;
        }
    }
}
