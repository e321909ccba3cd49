//! In-process push queue for background jobs and the schedules feeding it.

use std::time::Duration;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, warn};

use crate::{
    services::{average_service, reminder_service},
    state::SharedState,
};

/// Work items executed by the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Recompute the cached average points of won games.
    RefreshAveragePoints,
    /// Email every player with unfinished games.
    SendReminders,
}

/// Sending half of the job queue; the receiving half is claimed once by the worker.
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Job>>>,
}

impl JobQueue {
    /// Queue whose receiver is still unclaimed.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Queue `job` without waiting for it to run.
    pub fn enqueue(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!(?job, "job worker is gone; dropping job");
        } else {
            debug!(?job, "job enqueued");
        }
    }

    pub(crate) async fn take_receiver(&self) -> Option<mpsc::UnboundedReceiver<Job>> {
        self.rx.lock().await.take()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a single job to completion, logging its outcome.
pub async fn run_job(state: &SharedState, job: Job) {
    match job {
        Job::RefreshAveragePoints => match average_service::refresh_average_points(state).await {
            Ok(Some(average)) => info!(average, "average points cache refreshed"),
            Ok(None) => debug!("no won games yet; average points cache left untouched"),
            Err(err) => error!(error = %err, "failed to refresh average points cache"),
        },
        Job::SendReminders => match reminder_service::send_reminders(state).await {
            Ok(sent) => info!(sent, "reminder run finished"),
            Err(err) => error!(error = %err, "failed to send reminders"),
        },
    }
}

/// Spawn the worker draining the job queue.
///
/// Returns `None` when a worker already claimed the queue.
pub async fn spawn_worker(state: SharedState) -> Option<JoinHandle<()>> {
    let Some(mut rx) = state.jobs().take_receiver().await else {
        warn!("job worker already running");
        return None;
    };

    Some(tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            run_job(&state, job).await;
        }
        info!("job queue closed; worker stopping");
    }))
}

/// Spawn the interval schedules enqueueing the periodic jobs.
pub fn spawn_schedules(state: SharedState) {
    let config = state.config();
    schedule(
        state.clone(),
        Job::SendReminders,
        config.reminder_interval,
    );
    schedule(
        state.clone(),
        Job::RefreshAveragePoints,
        config.average_refresh_interval,
    );
}

fn schedule(state: SharedState, job: Job, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(?job, period_secs = period.as_secs(), "job schedule started");
        loop {
            ticker.tick().await;
            state.jobs().enqueue(job);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receiver_is_claimed_once() {
        let queue = JobQueue::new();
        let mut rx = queue.take_receiver().await.unwrap();
        assert!(queue.take_receiver().await.is_none());

        queue.enqueue(Job::SendReminders);
        queue.enqueue(Job::RefreshAveragePoints);
        assert_eq!(rx.recv().await, Some(Job::SendReminders));
        assert_eq!(rx.recv().await, Some(Job::RefreshAveragePoints));
    }

    #[tokio::test]
    async fn enqueue_after_worker_exit_is_dropped() {
        let queue = JobQueue::new();
        drop(queue.take_receiver().await);
        queue.enqueue(Job::RefreshAveragePoints);
    }
}
