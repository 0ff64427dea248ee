//! New agent draft lifecycle.
//!
//! A draft marks "the next message sent in workspace W starts a new thread".
//! While that first send is in progress the coordinator exposes the workspace
//! as *starting*; the marker clears once a thread becomes active there, or after
//! a fixed delay following the send when no thread shows up.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::ShellConfig;

#[derive(Default)]
struct DraftState {
    active_workspace_id: Option<String>,
    active_thread_id: Option<String>,
    draft_workspace_id: Option<String>,
    starting_workspace_id: Option<String>,
    /// Bumped by every draft-start call and every clear; a clear timer only
    /// fires for the generation that armed it.
    generation: u64,
    clear_timer: Option<JoinHandle<()>>,
    /// Completion signal of the most recent draft-start call.
    tail: Option<oneshot::Receiver<()>>,
}

impl DraftState {
    fn clear_starting(&mut self) {
        self.starting_workspace_id = None;
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
    }
}

#[derive(Clone)]
pub struct NewAgentDraft {
    state: Arc<Mutex<DraftState>>,
    clear_delay: Duration,
}

impl NewAgentDraft {
    pub fn new(config: &ShellConfig) -> Self {
        Self::with_clear_delay(config.draft_start_clear_delay())
    }

    pub fn with_clear_delay(clear_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(DraftState::default())),
            clear_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DraftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feeds the shell's current selection. A thread becoming active in the
    /// draft's workspace ends both the draft and the starting indicator.
    pub fn sync(&self, active_workspace_id: Option<&str>, active_thread_id: Option<&str>) {
        let mut state = self.lock();
        state.active_workspace_id = active_workspace_id.map(str::to_string);
        state.active_thread_id = active_thread_id.map(str::to_string);

        if state.active_thread_id.is_none() {
            return;
        }
        if state.starting_workspace_id.is_some()
            && state.starting_workspace_id == state.active_workspace_id
        {
            tracing::debug!(
                workspace_id = ?state.active_workspace_id,
                "thread activated; clearing draft start"
            );
            state.clear_starting();
        }
        if state.draft_workspace_id.is_some()
            && state.draft_workspace_id == state.active_workspace_id
        {
            state.draft_workspace_id = None;
        }
    }

    pub fn start_new_agent_draft(&self, workspace_id: &str) {
        self.lock().draft_workspace_id = Some(workspace_id.to_string());
    }

    pub fn clear_draft_state(&self) {
        let mut state = self.lock();
        state.draft_workspace_id = None;
        state.clear_starting();
    }

    pub fn new_agent_draft_workspace_id(&self) -> Option<String> {
        self.lock().draft_workspace_id.clone()
    }

    pub fn is_draft_mode_for(&self, workspace_id: &str) -> bool {
        let state = self.lock();
        state.draft_workspace_id.as_deref() == Some(workspace_id)
            && state.active_thread_id.is_none()
    }

    pub fn starting_draft_thread_workspace_id(&self) -> Option<String> {
        self.lock().starting_workspace_id.clone()
    }

    pub fn is_starting_for(&self, workspace_id: &str) -> bool {
        self.lock().starting_workspace_id.as_deref() == Some(workspace_id)
    }

    /// Marks the active workspace as starting right away, then runs `runner`
    /// once every earlier draft-start call has settled. Calls are never dropped
    /// or merged; the runner's output is returned unchanged.
    pub fn run_with_draft_start<F, Fut, T>(&self, runner: F) -> impl Future<Output = T> + use<F, Fut, T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (generation, previous, done_tx) = {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            if let Some(timer) = state.clear_timer.take() {
                timer.abort();
            }
            state.starting_workspace_id = state.active_workspace_id.clone();
            let (done_tx, done_rx) = oneshot::channel();
            let previous = state.tail.replace(done_rx);
            (state.generation, previous, done_tx)
        };

        let this = self.clone();
        async move {
            if let Some(previous) = previous {
                // A dropped sender also means the earlier call is over.
                let _ = previous.await;
            }
            let output = runner().await;
            this.arm_clear_timer(generation);
            let _ = done_tx.send(());
            output
        }
    }

    fn arm_clear_timer(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation || state.starting_workspace_id.is_none() {
            return;
        }

        let weak = Arc::downgrade(&self.state);
        let delay = self.clear_delay;
        state.clear_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == generation {
                tracing::debug!(
                    workspace_id = ?state.starting_workspace_id,
                    "no thread activated after draft start; clearing"
                );
                state.starting_workspace_id = None;
                state.clear_timer = None;
            }
        }));
    }

    /// Cancels the pending clear timer.
    pub fn unmount(&self) {
        if let Some(timer) = self.lock().clear_timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn newer_call_keeps_indicator_past_older_timer() {
        let draft = NewAgentDraft::with_clear_delay(Duration::from_millis(4000));
        draft.sync(Some("ws-1"), None);

        draft.run_with_draft_start(|| async {}).await;
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let (release_tx, release_rx) = oneshot::channel::<()>();
        let pending = tokio::spawn(draft.run_with_draft_start(|| async move {
            let _ = release_rx.await;
        }));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(
            draft.starting_draft_thread_workspace_id().as_deref(),
            Some("ws-1")
        );

        let _ = release_tx.send(());
        pending.await.expect("draft start task");
        tokio::time::sleep(Duration::from_millis(4001)).await;
        assert_eq!(draft.starting_draft_thread_workspace_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn thread_activation_clears_draft_and_starting_state() {
        let draft = NewAgentDraft::with_clear_delay(Duration::from_millis(4000));
        draft.sync(Some("ws-1"), None);
        draft.start_new_agent_draft("ws-1");
        assert!(draft.is_draft_mode_for("ws-1"));

        draft.run_with_draft_start(|| async {}).await;
        assert!(draft.is_starting_for("ws-1"));

        draft.sync(Some("ws-1"), Some("thread-9"));
        assert_eq!(draft.starting_draft_thread_workspace_id(), None);
        assert_eq!(draft.new_agent_draft_workspace_id(), None);
        assert!(!draft.is_draft_mode_for("ws-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn thread_in_other_workspace_keeps_draft() {
        let draft = NewAgentDraft::with_clear_delay(Duration::from_millis(4000));
        draft.sync(Some("ws-1"), None);
        draft.start_new_agent_draft("ws-1");
        draft.run_with_draft_start(|| async {}).await;

        draft.sync(Some("ws-2"), Some("thread-2"));
        assert_eq!(draft.new_agent_draft_workspace_id().as_deref(), Some("ws-1"));
        assert!(draft.is_starting_for("ws-1"));

        draft.clear_draft_state();
        assert_eq!(draft.new_agent_draft_workspace_id(), None);
        assert_eq!(draft.starting_draft_thread_workspace_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_clear_timer() {
        let draft = NewAgentDraft::with_clear_delay(Duration::from_millis(4000));
        draft.sync(Some("ws-1"), None);
        draft.run_with_draft_start(|| async {}).await;
        draft.unmount();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(
            draft.starting_draft_thread_workspace_id().as_deref(),
            Some("ws-1")
        );
    }
}
