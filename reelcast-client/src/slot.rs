//! Single active session per action
//!
//! A UI action (say, "render a short") should never have two sessions racing
//! to update the same observer. [`SessionSlot`] holds the current session of
//! one action and cancels it whenever a new one starts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reelcast_core::domain::render::RenderKind;
use tracing::debug;
use uuid::Uuid;

use crate::poller::{JobPoller, PollError, PollObserver, PollOptions, PollSession, SessionHandle};

/// Holds at most one live session for a logical action
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    current: Arc<Mutex<Option<SessionHandle>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the current session, then submits and polls a new job
    ///
    /// The previous session is cancelled before the new submission is sent,
    /// so its observer sees nothing more even if the submission fails.
    pub async fn start<O: PollObserver>(
        &self,
        poller: &JobPoller,
        kind: RenderKind,
        options: PollOptions,
        observer: O,
    ) -> Result<PollSession, PollError> {
        self.cancel_current();
        let session = poller.start(kind, options, observer).await?;
        self.replace(session.handle());
        Ok(session)
    }

    /// Installs a session, cancelling and returning the one it replaces
    pub fn replace(&self, handle: SessionHandle) -> Option<SessionHandle> {
        let previous = self.lock().replace(handle);
        if let Some(previous) = &previous {
            if previous.cancel() {
                debug!("Replaced live poll session {}", previous.id());
            }
        }
        previous
    }

    /// Cancels and removes the current session. Returns whether one was live.
    pub fn cancel_current(&self) -> bool {
        let current = self.lock().take();
        current.is_some_and(|handle| handle.cancel())
    }

    /// Removes the session with `id` without cancelling it
    ///
    /// Does nothing if another session has been installed since.
    pub fn clear(&self, id: Uuid) -> bool {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|handle| handle.id() == id) {
            current.take();
            true
        } else {
            false
        }
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.lock().as_ref().map(SessionHandle::id)
    }

    fn lock(&self) -> MutexGuard<'_, Option<SessionHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reelcast_core::domain::job::JobHandle;

    use super::*;
    use crate::poller::SessionState;
    use crate::poller::testing::{RecordingObserver, ScriptedBackend};

    fn options() -> PollOptions {
        PollOptions::default().with_interval(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_start_cancels_previous_session() {
        let backend = Arc::new(ScriptedBackend::with_statuses(vec![]));
        let poller = JobPoller::new(backend.clone());
        let slot = SessionSlot::new();

        let first_observer = RecordingObserver::default();
        let first = slot
            .start(&poller, RenderKind::Short, options(), first_observer.clone())
            .await
            .unwrap();
        assert_eq!(slot.current_id(), Some(first.id()));

        *backend.start.lock().unwrap() = Some(Ok(JobHandle::new("J2").unwrap()));
        let second = slot
            .start(&poller, RenderKind::Long, options(), RecordingObserver::default())
            .await
            .unwrap();

        assert_eq!(first.state(), SessionState::Cancelled);
        assert_eq!(slot.current_id(), Some(second.id()));
        assert!(first.wait().await.is_none());
        assert_eq!(first_observer.update_count(), 0);
        assert_eq!(first_observer.finish_count(), 0);

        assert!(slot.cancel_current());
        assert!(slot.current_id().is_none());
        assert!(second.wait().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submission_still_cancels_previous() {
        let backend = Arc::new(ScriptedBackend::with_statuses(vec![]));
        let poller = JobPoller::new(backend.clone());
        let slot = SessionSlot::new();

        let first = slot
            .start(&poller, RenderKind::Short, options(), RecordingObserver::default())
            .await
            .unwrap();

        // Nothing scripted for the second start call
        let err = slot
            .start(&poller, RenderKind::Short, options(), RecordingObserver::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Submission(_)));
        assert_eq!(first.state(), SessionState::Cancelled);
        assert!(slot.current_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_only_matching_session() {
        let backend = Arc::new(ScriptedBackend::with_statuses(vec![]));
        let poller = JobPoller::new(backend);
        let slot = SessionSlot::new();

        let session = slot
            .start(&poller, RenderKind::Short, options(), RecordingObserver::default())
            .await
            .unwrap();

        assert!(!slot.clear(Uuid::new_v4()));
        assert!(slot.clear(session.id()));
        assert!(slot.current_id().is_none());

        // Clearing does not cancel
        assert!(!session.state().is_terminal());
        assert!(session.cancel());
    }
}
