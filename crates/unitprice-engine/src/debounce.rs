//! Coalescing of page-change notices into debounced rescans.
//!
//! The first notice schedules a rescan one window later; notices arriving
//! while it is pending are absorbed. Once it fires, the next notice starts a
//! new window.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    scheduled_at: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            scheduled_at: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a change notice. Returns `true` when it scheduled a rescan.
    pub fn notify(&mut self, now: Instant) -> bool {
        if self.scheduled_at.is_some() {
            return false;
        }
        self.scheduled_at = Some(now + self.window);
        true
    }

    /// When the pending rescan is due, if one is scheduled.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduled_at
    }

    /// Returns `true` and clears the schedule once the rescan is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.scheduled_at {
            Some(due) if now >= due => {
                self.scheduled_at = None;
                true
            }
            _ => false,
        }
    }

    /// Clears any pending rescan regardless of its deadline.
    pub fn take(&mut self) -> bool {
        self.scheduled_at.take().is_some()
    }
}

/// Drains change notices from `notices`, calling `on_fire` at most once per
/// window of `debouncer`. A rescan already pending on entry fires at its
/// deadline, and one still pending when the sender side closes is flushed
/// before returning.
///
/// Returns the number of times `on_fire` ran.
pub async fn debounce_notices<F>(
    mut notices: mpsc::Receiver<()>,
    debouncer: &mut Debouncer,
    mut on_fire: F,
) -> usize
where
    F: FnMut(),
{
    let window = debouncer.window();
    let mut fired = 0usize;

    loop {
        let deadline = debouncer.deadline();
        let wake_at = deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);

        tokio::select! {
            notice = notices.recv() => {
                if notice.is_some() {
                    if debouncer.notify(Instant::now()) {
                        tracing::trace!(window_ms = window.as_millis(), "rescan scheduled");
                    }
                    continue;
                }
                if debouncer.take() {
                    on_fire();
                    fired += 1;
                }
                break;
            }
            () = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                if debouncer.take() {
                    on_fire();
                    fired += 1;
                }
            }
        }
    }

    tracing::debug!(fired, "change notice source closed");
    fired
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn first_notice_schedules_and_later_ones_are_absorbed() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(debouncer.notify(start));
        assert!(!debouncer.notify(start + Duration::from_millis(10)));
        assert_eq!(debouncer.deadline(), Some(start + WINDOW));
    }

    #[test]
    fn poll_fires_only_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.notify(start);
        assert!(!debouncer.poll(start + Duration::from_millis(99)));
        assert!(debouncer.poll(start + WINDOW));
        assert!(debouncer.deadline().is_none());
        assert!(!debouncer.poll(start + WINDOW * 2));
    }

    #[test]
    fn notice_after_fire_schedules_again() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.notify(start);
        debouncer.poll(start + WINDOW);
        assert!(debouncer.notify(start + WINDOW * 2));
        assert_eq!(debouncer.deadline(), Some(start + WINDOW * 3));
    }

    #[test]
    fn take_clears_pending_rescan() {
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(!debouncer.take());
        debouncer.notify(Instant::now());
        assert!(debouncer.take());
        assert!(debouncer.deadline().is_none());
    }

    #[tokio::test]
    async fn burst_of_notices_fires_once() {
        let (tx, rx) = mpsc::channel(16);
        for _ in 0..5 {
            tx.send(()).await.unwrap();
        }
        drop(tx);

        let mut count = 0;
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        let fired = debounce_notices(rx, &mut debouncer, || count += 1).await;
        assert_eq!(fired, 1);
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn separate_windows_fire_separately() {
        let (tx, rx) = mpsc::channel(16);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handle = tokio::spawn(async move {
            let mut debouncer = Debouncer::new(Duration::from_millis(20));
            debounce_notices(rx, &mut debouncer, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
        });

        tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tx.send(()).await.unwrap();
        drop(tx);
        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn closed_source_without_notices_never_fires() {
        let (tx, rx) = mpsc::channel::<()>(1);
        drop(tx);
        assert_eq!(debounce_notices(rx, &mut Debouncer::new(WINDOW), || {}).await, 0);
    }

    #[tokio::test]
    async fn rescan_pending_on_entry_fires_at_its_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.notify(Instant::now());

        let (tx, rx) = mpsc::channel::<()>(1);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handle = tokio::spawn(async move {
            debounce_notices(rx, &mut debouncer, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        drop(tx);
        assert_eq!(handle.await.unwrap(), 1);
    }
}
