//! Repeating tick source shared by the countdown and the pollers.

use std::future::Future;

use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Creates a ticker whose first tick fires one `period` from now.
///
/// Missed ticks are skipped rather than replayed in a burst.
pub fn ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Resolves with the output of the pending request, or never if there is none.
///
/// Lets a poll loop `select!` between its ticker and at most one
/// outstanding request.
pub(crate) async fn settle<F>(request: &mut Option<F>) -> F::Output
where
    F: Future + Unpin,
{
    match request.as_mut() {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}
