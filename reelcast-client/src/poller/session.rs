//! Poll sessions
//!
//! A session is one spawned task polling one job. It ends exactly once: with
//! a terminal callback (done, failed, timed out, query error) or silently
//! when cancelled.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use reelcast_core::domain::job::{JobHandle, JobStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::observer::{JobOutcome, PollObserver, ProgressUpdate};
use super::{PollError, PollOptions};
use crate::backend::RenderBackend;

/// Lifecycle state of a poll session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Polling,
    Done,
    Failed,
    TimedOut,
    Cancelled,
    QueryError,
}

impl SessionState {
    /// Every state except `Start` and `Polling` is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Start | SessionState::Polling)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Start => "start",
            SessionState::Polling => "polling",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
            SessionState::TimedOut => "timed out",
            SessionState::Cancelled => "cancelled",
            SessionState::QueryError => "query error",
        };
        f.write_str(label)
    }
}

thread_local! {
    /// Address of the gate whose callback is running on this thread, or 0
    static IN_CALLBACK: Cell<usize> = const { Cell::new(0) };
}

/// Serializes observer callbacks against cancellation
///
/// Once `close` returns, no callback starts anymore. A callback that is
/// already running finishes first, unless `close` is called from inside a
/// callback of the same gate, which must not wait for itself.
#[derive(Debug, Default)]
struct DeliveryGate {
    closed: AtomicBool,
    delivering: Mutex<()>,
}

impl DeliveryGate {
    /// Runs `f` unless the gate is closed. Returns whether it ran.
    fn deliver(&self, f: impl FnOnce()) -> bool {
        let _guard = self.delivering.lock().unwrap_or_else(PoisonError::into_inner);
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.in_callback(f);
        true
    }

    /// Runs `f` and closes the gate, unless it is already closed
    fn finish(&self, f: impl FnOnce()) -> bool {
        let _guard = self.delivering.lock().unwrap_or_else(PoisonError::into_inner);
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.in_callback(f);
        true
    }

    /// Closes the gate. Returns whether it was open.
    fn close(&self) -> bool {
        if IN_CALLBACK.with(Cell::get) == self.address() {
            return !self.closed.swap(true, Ordering::AcqRel);
        }
        let _guard = self.delivering.lock().unwrap_or_else(PoisonError::into_inner);
        !self.closed.swap(true, Ordering::AcqRel)
    }

    fn address(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }

    fn in_callback(&self, f: impl FnOnce()) {
        struct Reset(usize);

        impl Drop for Reset {
            fn drop(&mut self) {
                IN_CALLBACK.with(|flag| flag.set(self.0));
            }
        }

        let _reset = Reset(IN_CALLBACK.with(|flag| flag.replace(self.address())));
        f();
    }
}

/// Cloneable handle that can cancel a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    job: JobHandle,
    token: CancellationToken,
    gate: Arc<DeliveryGate>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    /// Cancels the session
    ///
    /// When this returns, no further update or terminal callback will fire.
    /// Called from another thread, it waits for a callback of this session
    /// that is already running. Called from one of this session's own
    /// callbacks, it returns at once. Two sessions whose running callbacks
    /// cancel each other at the same time deadlock.
    /// An in-flight status query is not aborted; its response is discarded.
    /// Returns `false` if the session had already ended.
    pub fn cancel(&self) -> bool {
        let was_open = self.gate.close();
        self.token.cancel();
        if was_open {
            self.state.send_replace(SessionState::Cancelled);
            info!("Cancelled poll session {} (job {})", self.id, self.job);
        }
        was_open
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }
}

/// A running poll session, returned to the caller who owns it
///
/// Dropping the session does not stop it; call [`PollSession::cancel`].
#[derive(Debug)]
pub struct PollSession {
    handle: SessionHandle,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<Option<Result<JobOutcome, PollError>>>,
}

impl PollSession {
    pub(super) fn spawn<O: PollObserver>(
        backend: Arc<dyn RenderBackend>,
        job: JobHandle,
        options: PollOptions,
        observer: O,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Start);
        let handle = SessionHandle {
            id: Uuid::new_v4(),
            job,
            token: CancellationToken::new(),
            gate: Arc::new(DeliveryGate::default()),
            state: Arc::new(state_tx),
        };

        let task = tokio::spawn(run(handle.clone(), backend, options, observer));

        Self {
            handle,
            state: state_rx,
            task,
        }
    }

    pub fn id(&self) -> Uuid {
        self.handle.id
    }

    pub fn job(&self) -> &JobHandle {
        &self.handle.job
    }

    /// A handle that can cancel this session from elsewhere
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver for state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// See [`SessionHandle::cancel`]
    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }

    /// Waits for the session to end
    ///
    /// Returns the terminal result, or `None` if the session was cancelled
    /// before reaching one.
    pub async fn wait(self) -> Option<Result<JobOutcome, PollError>> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => None,
        }
    }
}

/// The polling loop of one session
async fn run<O: PollObserver>(
    session: SessionHandle,
    backend: Arc<dyn RenderBackend>,
    options: PollOptions,
    mut observer: O,
) -> Option<Result<JobOutcome, PollError>> {
    let SessionHandle {
        id,
        job,
        token,
        gate,
        state,
    } = session;

    state.send_if_modified(|current| {
        if *current == SessionState::Start {
            *current = SessionState::Polling;
            true
        } else {
            false
        }
    });
    debug!(
        "Poll session {} started for job {} (interval: {:?})",
        id, job, options.interval
    );

    let started = Instant::now();
    let deadline = options.max_duration.map(|max| started + max);
    let mut attempts = 0u32;

    let (result, terminal) = loop {
        let mut wake = Instant::now() + options.interval;
        if let Some(deadline) = deadline {
            wake = wake.min(deadline);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => return None,
            _ = tokio::time::sleep_until(wake) => {}
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            let elapsed = started.elapsed();
            break (
                Err(PollError::TimedOut { attempts, elapsed }),
                SessionState::TimedOut,
            );
        }

        attempts += 1;
        debug!("Checking status of job {} (attempt {})", job, attempts);
        let fetched = match deadline {
            Some(deadline) => {
                tokio::time::timeout_at(deadline, backend.fetch_status(&job))
                    .await
                    .ok()
            }
            None => Some(backend.fetch_status(&job).await),
        };

        if token.is_cancelled() {
            warn!(
                "Discarding status response for job {} from cancelled session {}",
                job, id
            );
            return None;
        }

        let Some(fetched) = fetched else {
            warn!(
                "Status query {} for job {} still pending at the duration bound",
                attempts, job
            );
            let elapsed = started.elapsed();
            break (
                Err(PollError::TimedOut { attempts, elapsed }),
                SessionState::TimedOut,
            );
        };

        match fetched {
            Err(e) => break (Err(PollError::Query(e)), SessionState::QueryError),
            Ok(JobStatus::Done { result_url }) => {
                let outcome = JobOutcome {
                    job: job.clone(),
                    result_url,
                    attempts,
                };
                break (Ok(outcome), SessionState::Done);
            }
            Ok(JobStatus::Failed { message }) => {
                break (Err(PollError::JobFailed(message)), SessionState::Failed);
            }
            Ok(status) => {
                let update = ProgressUpdate {
                    job: job.clone(),
                    attempt: attempts,
                    status,
                    observed_at: chrono::Utc::now(),
                };
                if !gate.deliver(|| observer.on_update(&update)) {
                    return None;
                }

                if options.max_attempts.is_some_and(|max| attempts >= max) {
                    let elapsed = started.elapsed();
                    break (
                        Err(PollError::TimedOut { attempts, elapsed }),
                        SessionState::TimedOut,
                    );
                }
            }
        }
    };

    let delivered = gate.finish(|| {
        observer.on_finish(&result);
        state.send_replace(terminal);
    });
    if !delivered {
        return None;
    }

    match &result {
        Ok(outcome) => info!(
            "Job {} done after {} status check(s)",
            job, outcome.attempts
        ),
        Err(e) => info!("Poll session {} for job {} ended: {}", id, job, e),
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Start.is_terminal());
        assert!(!SessionState::Polling.is_terminal());
        for state in [
            SessionState::Done,
            SessionState::Failed,
            SessionState::TimedOut,
            SessionState::Cancelled,
            SessionState::QueryError,
        ] {
            assert!(state.is_terminal(), "{} should be terminal", state);
        }
    }

    #[test]
    fn test_gate_blocks_after_close() {
        let gate = DeliveryGate::default();
        let mut calls = 0;

        assert!(gate.deliver(|| calls += 1));
        assert!(gate.close());
        assert!(!gate.deliver(|| calls += 1));
        assert!(!gate.finish(|| calls += 1));
        assert!(!gate.close());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_gate_finishes_once() {
        let gate = DeliveryGate::default();
        let mut finished = 0;

        assert!(gate.finish(|| finished += 1));
        assert!(!gate.finish(|| finished += 1));
        assert!(!gate.close());
        assert_eq!(finished, 1);
    }

    #[test]
    fn test_close_from_inside_callback() {
        let gate = DeliveryGate::default();
        let mut closed_inside = false;

        assert!(gate.deliver(|| closed_inside = gate.close()));
        assert!(closed_inside);
        assert!(!gate.deliver(|| panic!("gate should be closed")));
    }

    #[test]
    fn test_close_of_other_gate_waits_for_its_callback() {
        let own = DeliveryGate::default();
        let other = Arc::new(DeliveryGate::default());
        let finished = Arc::new(AtomicBool::new(false));
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let worker = {
            let other = other.clone();
            let finished = finished.clone();
            std::thread::spawn(move || {
                other.deliver(|| {
                    started_tx.send(()).unwrap();
                    std::thread::sleep(std::time::Duration::from_millis(50));
                    finished.store(true, Ordering::SeqCst);
                })
            })
        };
        started_rx.recv().unwrap();

        let mut finished_before_close = false;
        assert!(own.deliver(|| {
            assert!(other.close());
            finished_before_close = finished.load(Ordering::SeqCst);
        }));

        assert!(finished_before_close);
        assert!(worker.join().unwrap());
        assert!(!other.deliver(|| panic!("gate should be closed")));
    }
}
