//! Timer driving the sparkline batch loop

use report_tables_core::{ChartRenderer, Enhancer, Page};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Tick the sparkline loop every `period` until it finishes.
///
/// The first batch is drawn one full period after the call, like a repeating
/// browser timer. Returns the number of ticks run.
pub async fn drive_sparklines<R: ChartRenderer>(
    enhancer: &mut Enhancer<R>,
    page: &mut Page,
    period: Duration,
) -> usize {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks = 0;
    loop {
        timer.tick().await;
        let tick = enhancer.tick_sparklines(page);
        ticks += 1;
        debug!(tick = ticks, processed = tick.processed, "Sparkline timer fired");
        if tick.finished {
            break;
        }
    }

    info!(ticks, "Sparkline timer stopped");
    ticks
}
