//! Events posted to the TUI loop by timers

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Wizard that started a simulated submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Booking,
    Workshop,
}

/// Application events that arrive outside of key handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Simulated submission delay elapsed
    SubmitFinished { form: FormKind, ticket: u64 },
    /// Simulated login delay elapsed
    LoginFinished { ticket: u64 },
    /// Toast lifetime elapsed
    ToastExpired(u64),
    /// Monitoring clock
    ClockTick,
}

pub type EventSender = UnboundedSender<AppEvent>;

/// Posts `event` once after `delay`
pub fn schedule(events: &EventSender, delay: Duration, event: AppEvent) -> JoinHandle<()> {
    let events = events.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = events.send(event);
    })
}

/// Posts `event` every `period` until the receiver goes away
pub fn every(events: &EventSender, period: Duration, event: AppEvent) -> JoinHandle<()> {
    let events = events.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if events.send(event.clone()).is_err() {
                break;
            }
        }
    })
}

/// Pending timer owned by a screen. Replacing, cancelling or dropping it
/// aborts the task, so nothing fires after the owner is gone.
#[derive(Debug, Default)]
pub struct Timer(Option<JoinHandle<()>>);

impl Timer {
    pub fn set(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.0 = Some(handle);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_schedule_posts_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = schedule(&tx, Duration::from_millis(5), AppEvent::ToastExpired(7));
        assert_eq!(rx.recv().await, Some(AppEvent::ToastExpired(7)));
    }

    #[tokio::test]
    async fn test_cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::default();
        timer.set(schedule(
            &tx,
            Duration::from_millis(30),
            AppEvent::LoginFinished { ticket: 1 },
        ));
        assert!(timer.is_pending());
        timer.cancel();
        assert!(!timer.is_pending());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_timer_is_aborted() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut timer = Timer::default();
            timer.set(every(&tx, Duration::from_millis(10), AppEvent::ClockTick));
            assert_eq!(rx.recv().await, Some(AppEvent::ClockTick));
        }
        tokio::time::sleep(Duration::from_millis(40)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
    }
}
