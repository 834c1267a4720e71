// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cancellable waits that report progress on the waiting node.

use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::consts::PROGRESS_TICK;
use crate::engine::NodeContext;

/// Waits `delay`, updating the node's progress every [`PROGRESS_TICK`].
///
/// Returns `false` when the context was cancelled before the delay elapsed.
/// Progress reaches 100 only when the wait completes.
pub async fn delay_with_progress(ctx: &NodeContext, delay: Duration) -> bool {
    delay_with_progress_every(ctx, delay, PROGRESS_TICK).await
}

pub async fn delay_with_progress_every(ctx: &NodeContext, delay: Duration, tick: Duration) -> bool {
    if delay.is_zero() {
        ctx.set_progress(100.0);
        return !ctx.is_cancelled();
    }

    let started = Instant::now();
    let deadline = started + delay;
    let mut ticker = time::interval(tick.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return false,
            _ = time::sleep_until(deadline) => {
                ctx.set_progress(100.0);
                return true;
            }
            _ = ticker.tick() => {
                ctx.set_progress(percent_complete(started.elapsed(), delay));
            }
        }
    }
}

fn percent_complete(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).min(100.0)
}
