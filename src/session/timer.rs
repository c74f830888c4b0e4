use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Interval;

use crate::session::controller::{QuizSession, SubmissionResult};

/// Source of one-second ticks for a session countdown.
#[async_trait]
pub trait TickSource: Send {
    /// Waits for the next tick. `false` means the source is exhausted.
    async fn next_tick(&mut self) -> bool;
}

#[async_trait]
impl TickSource for Interval {
    async fn next_tick(&mut self) -> bool {
        self.tick().await;
        true
    }
}

#[async_trait]
impl TickSource for mpsc::Receiver<()> {
    async fn next_tick(&mut self) -> bool {
        self.recv().await.is_some()
    }
}

#[async_trait]
impl TickSource for Box<dyn TickSource> {
    async fn next_tick(&mut self) -> bool {
        (**self).next_tick().await
    }
}

/// Builds a fresh tick source for each new session.
pub type TickSourceFactory = Arc<dyn Fn() -> Box<dyn TickSource> + Send + Sync>;

/// Factory yielding real one-second ticks.
pub fn wall_clock_ticks() -> TickSourceFactory {
    Arc::new(|| Box::new(interval_ticks(std::time::Duration::from_secs(1))))
}

/// Wall-clock tick source firing every `period`; the first tick comes after one period.
pub fn interval_ticks(period: std::time::Duration) -> Interval {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

/// Background task driving [`QuizSession::tick`].
///
/// The task ends by itself once the session is submitted, whichever path
/// submitted it. On expiry `on_expired` runs while the session lock is still
/// held, so no other caller observes the submission before it is handled.
/// Dropping the timer aborts the task.
pub struct SessionTimer {
    handle: JoinHandle<()>,
}

impl SessionTimer {
    pub fn spawn<T, F, Fut>(session: Arc<Mutex<QuizSession>>, mut ticks: T, on_expired: F) -> Self
    where
        T: TickSource + 'static,
        F: FnOnce(SubmissionResult, QuizSession) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            while ticks.next_tick().await {
                let mut session = session.lock().await;
                if session.is_submitted() {
                    return;
                }

                if let Some(result) = session.tick() {
                    log::info!(
                        "Session countdown expired, submitted with score {}/{}",
                        result.score,
                        result.total_questions
                    );
                    on_expired(result, session.clone()).await;
                    return;
                }
            }
            log::debug!("Tick source closed before session finished");
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
