//! Periodic background jobs.
//!
//! Schedulers are explicit objects constructed and started by the
//! process entry point; nothing starts as an import side effect. Each
//! one owns its task and shuts down through `stop()`. Ticks are awaited
//! to completion before the next delay starts, so passes from the same
//! scheduler never overlap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use log::{error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A named periodic job running on the tokio runtime.
///
/// The tick callback is synchronous domain code; it runs on the
/// blocking pool so file IO and provider calls cannot stall the
/// runtime. A panicking tick is contained and logged; the schedule
/// keeps firing.
pub struct Scheduler {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Start a job that first fires after `initial_delay` and then
    /// every `period`.
    pub fn spawn<F>(
        name: &'static str,
        initial_delay: Duration,
        period: Duration,
        tick: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (shutdown, mut rx) = watch::channel(false);
        let tick = Arc::new(tick);

        let handle = tokio::spawn(async move {
            info!(
                "{} scheduler started (first run in {:?}, period {:?})",
                name, initial_delay, period
            );
            let mut delay = initial_delay;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = rx.changed() => break,
                }

                let job = tick.clone();
                if let Err(err) = tokio::task::spawn_blocking(move || job()).await {
                    error!("{} scheduler tick panicked: {}", name, err);
                }
                delay = period;
            }
            info!("{} scheduler stopped", name);
        });

        Self {
            name,
            shutdown,
            handle,
        }
    }

    /// Signal the job to stop and wait for it to wind down.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.handle.await {
            error!("{} scheduler join error: {}", self.name, err);
        }
    }
}

/// Time until the next local occurrence of `hour`:00, for daily jobs
/// anchored to a clock time.
pub fn until_next_local_hour(hour: u32, now: DateTime<Local>) -> Duration {
    let at = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at);
    let target = if today > now.naive_local() {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (target - now.naive_local())
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_until_next_local_hour() {
        let morning = Local.with_ymd_and_hms(2024, 5, 6, 4, 30, 0).unwrap();
        assert_eq!(
            until_next_local_hour(6, morning),
            Duration::from_secs(90 * 60)
        );

        // Already past 6 AM: anchor to tomorrow
        let evening = Local.with_ymd_and_hms(2024, 5, 6, 18, 0, 0).unwrap();
        assert_eq!(
            until_next_local_hour(6, evening),
            Duration::from_secs(12 * 60 * 60)
        );

        // Exactly on the hour counts as passed
        let on_the_hour = Local.with_ymd_and_hms(2024, 5, 6, 6, 0, 0).unwrap();
        assert_eq!(
            until_next_local_hour(6, on_the_hour),
            Duration::from_secs(24 * 60 * 60)
        );
    }

    #[tokio::test]
    async fn test_scheduler_ticks_and_stops() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ticks = counter.clone();
        let scheduler = Scheduler::spawn(
            "test",
            Duration::from_millis(0),
            Duration::from_millis(20),
            move || {
                ticks.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.stop().await;
        let after_stop = counter.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected at least two ticks, got {}", after_stop);

        // No further ticks after stop
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_scheduler_survives_panicking_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ticks = counter.clone();
        let scheduler = Scheduler::spawn(
            "test-panic",
            Duration::from_millis(0),
            Duration::from_millis(15),
            move || {
                let n = ticks.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    panic!("boom");
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;
        assert!(counter.load(Ordering::SeqCst) >= 2);
    }
}
