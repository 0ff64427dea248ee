use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use crate::apps::normalize::normalize_apps_response;
use crate::config::ShellConfig;
use crate::debug_log::DebugSink;
use crate::error::HostError;
use crate::single_flight::{Admission, SingleFlight};
use crate::types::{AppOption, AppsListParams, DebugEntry, DebugSource, WorkspaceInfo};

/// Host side of `app/list`. Returns the raw, loosely shaped response.
#[async_trait]
pub trait AppListHost: Send + Sync {
    async fn app_list(
        &self,
        workspace_id: &str,
        params: AppsListParams,
    ) -> Result<Value, HostError>;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct FetchTarget {
    workspace_id: Option<String>,
    connected: bool,
    enabled: bool,
}

impl FetchTarget {
    fn fetchable(&self) -> Option<&str> {
        if self.connected && self.enabled {
            self.workspace_id.as_deref()
        } else {
            None
        }
    }

    fn is_active(&self, workspace_id: &str) -> bool {
        self.fetchable() == Some(workspace_id)
    }
}

#[derive(Default)]
struct AppsState {
    apps: Vec<AppOption>,
    target: FetchTarget,
    /// Workspace whose response (applied or not) arrived last.
    last_fetched: Option<String>,
    flight: SingleFlight<String>,
    retry_timer: Option<JoinHandle<()>>,
    retry_version: u64,
}

impl AppsState {
    fn reset(&mut self) {
        self.apps.clear();
        self.last_fetched = None;
        self.cancel_retry();
    }

    fn cancel_retry(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }
}

struct AppsShared {
    host: Arc<dyn AppListHost>,
    debug: Option<DebugSink>,
    page_size: u32,
    retry_delay: Duration,
    state: Mutex<AppsState>,
}

/// Installed apps of the active workspace, fetched one request at a time.
///
/// Requests arriving while one is in flight park in a single pending slot
/// (latest wins). Responses for a workspace that is no longer active are
/// dropped. A failed fetch is retried once per failure after a fixed delay.
/// Fetches and timers are spawned on the ambient Tokio runtime.
pub struct AppsFetcher {
    shared: Arc<AppsShared>,
}

impl AppsFetcher {
    pub fn new(
        host: Arc<dyn AppListHost>,
        config: &ShellConfig,
        debug: Option<DebugSink>,
    ) -> Self {
        Self {
            shared: Arc::new(AppsShared {
                host,
                debug,
                page_size: config.apps_page_size,
                retry_delay: config.apps_retry_delay(),
                state: Mutex::new(AppsState::default()),
            }),
        }
    }

    /// Feeds the active workspace and the enabled flag. Re-evaluates only when
    /// one of them changed.
    pub fn update(&self, active_workspace: Option<&WorkspaceInfo>, enabled: bool) {
        let target = FetchTarget {
            workspace_id: active_workspace.map(|workspace| workspace.id.clone()),
            connected: active_workspace.is_some_and(|workspace| workspace.connected),
            enabled,
        };
        {
            let mut state = self.shared.lock();
            if state.target == target {
                return;
            }
            state.target = target;
        }
        AppsShared::run_effect(&self.shared);
    }

    /// Fetches the active workspace again, or empties the list when there is
    /// nothing to fetch for.
    pub fn refresh(&self) {
        let workspace_id = {
            let mut state = self.shared.lock();
            match state.target.fetchable() {
                Some(workspace_id) => workspace_id.to_string(),
                None => {
                    state.reset();
                    return;
                }
            }
        };
        AppsShared::execute_fetch(&self.shared, workspace_id);
    }

    /// Current list without entries lacking an id or a name.
    pub fn apps(&self) -> Vec<AppOption> {
        self.shared
            .lock()
            .apps
            .iter()
            .filter(|app| !app.id.is_empty() && !app.name.is_empty())
            .cloned()
            .collect()
    }

    pub fn is_fetching(&self) -> bool {
        !self.shared.lock().flight.is_idle()
    }

    pub fn has_retry_scheduled(&self) -> bool {
        self.shared.lock().retry_timer.is_some()
    }

    pub fn last_fetched_workspace_id(&self) -> Option<String> {
        self.shared.lock().last_fetched.clone()
    }

    pub fn retry_version(&self) -> u64 {
        self.shared.lock().retry_version
    }

    /// Cancels the retry timer. Responses still in flight are discarded when
    /// they land.
    pub fn unmount(&self) {
        let mut state = self.shared.lock();
        state.target = FetchTarget::default();
        state.flight.clear_pending();
        state.cancel_retry();
    }
}

impl Drop for AppsFetcher {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl AppsShared {
    fn lock(&self) -> MutexGuard<'_, AppsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, slug: &str, source: DebugSource, label: &str, payload: Value) {
        if let Some(debug) = self.debug.as_ref() {
            debug(DebugEntry::now(slug, source, label, payload));
        }
    }

    fn run_effect(shared: &Arc<Self>) {
        let workspace_id = {
            let mut state = shared.lock();
            match state.target.fetchable() {
                None => {
                    state.reset();
                    state.flight.clear_pending();
                    return;
                }
                Some(workspace_id) if state.last_fetched.as_deref() == Some(workspace_id) => {
                    return;
                }
                Some(workspace_id) => workspace_id.to_string(),
            }
        };
        Self::execute_fetch(shared, workspace_id);
    }

    fn execute_fetch(shared: &Arc<Self>, workspace_id: String) {
        let admission = shared.lock().flight.begin(workspace_id.clone());
        if admission == Admission::Queued {
            tracing::debug!(%workspace_id, "app/list in flight; queued as pending");
            return;
        }
        tokio::spawn(Self::run_flight(Arc::clone(shared), workspace_id));
    }

    /// Owns the flight until no eligible pending request is left.
    async fn run_flight(shared: Arc<Self>, mut workspace_id: String) {
        loop {
            shared.emit(
                "client-apps-list",
                DebugSource::Client,
                "app/list",
                json!({ "workspaceId": workspace_id }),
            );
            let params = AppsListParams {
                cursor: None,
                limit: Some(shared.page_size),
            };
            let result = shared.host.app_list(&workspace_id, params).await;

            match result {
                Ok(response) => {
                    shared.emit(
                        "server-apps-list",
                        DebugSource::Server,
                        "app/list response",
                        response.clone(),
                    );
                    shared.apply_response(&workspace_id, &response);
                }
                Err(error) => {
                    let message = error.message();
                    tracing::warn!(%workspace_id, error = %message, "app/list failed");
                    shared.emit(
                        "client-apps-list-error",
                        DebugSource::Error,
                        "app/list error",
                        Value::String(message),
                    );
                    Self::schedule_retry(&shared, &workspace_id);
                }
            }

            match shared.take_next_pending(&workspace_id) {
                Some(next) => workspace_id = next,
                None => break,
            }
        }
    }

    fn apply_response(&self, workspace_id: &str, response: &Value) {
        let mut state = self.lock();
        if state.target.is_active(workspace_id) {
            state.apps = normalize_apps_response(response);
        } else {
            tracing::debug!(%workspace_id, "discarding app/list response for inactive workspace");
        }
        state.last_fetched = Some(workspace_id.to_string());
        state.cancel_retry();
    }

    fn schedule_retry(shared: &Arc<Self>, workspace_id: &str) {
        let mut state = shared.lock();
        if !state.target.is_active(workspace_id) || state.retry_timer.is_some() {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(shared);
        let delay = shared.retry_delay;
        tracing::debug!(%workspace_id, delay_ms = delay.as_millis() as u64, "app/list retry armed");
        state.retry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            {
                let mut state = shared.lock();
                state.retry_timer = None;
                state.retry_version = state.retry_version.wrapping_add(1);
            }
            Self::run_effect(&shared);
        }));
    }

    /// Ends the current flight; returns the pending workspace to fetch next,
    /// already admitted, when it is still the active one.
    fn take_next_pending(&self, finished: &str) -> Option<String> {
        let mut state = self.lock();
        let pending = state.flight.finish(&finished.to_string())?;
        if state.target.workspace_id.as_deref() != Some(pending.as_str()) {
            tracing::debug!(workspace_id = %pending, "dropping pending app/list for inactive workspace");
            return None;
        }
        state.flight.begin(pending.clone());
        Some(pending)
    }
}
