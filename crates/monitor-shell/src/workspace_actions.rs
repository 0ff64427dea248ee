//! User-facing workspace actions wired onto host operations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::composer::ComposerRef;
use crate::debug_log::DebugSink;
use crate::deferred::DeferredQueue;
use crate::error::HostError;
use crate::shortcut::{KeyBinding, KeyPress, NewAgentShortcut};
use crate::types::{DebugEntry, DebugSource, ShellTab, WorkspaceInfo};

const ADD_WORKSPACE_FAILED: &str = "Failed to add workspace.";

/// Workspace operations performed by the native host.
#[async_trait]
pub trait WorkspaceHost: Send + Sync {
    /// Prompts for a folder; `None` when the user cancels.
    async fn add_workspace(&self) -> Result<Option<WorkspaceInfo>, HostError>;
    async fn add_workspace_from_path(
        &self,
        path: &str,
    ) -> Result<Option<WorkspaceInfo>, HostError>;
}

/// Selection and navigation callbacks owned by the embedding UI.
pub trait WorkspaceShell: Send + Sync {
    fn set_active_thread_id(&self, thread_id: Option<&str>, workspace_id: &str);
    fn set_active_tab(&self, tab: ShellTab);
    fn exit_diff_view(&self);
    fn select_workspace(&self, workspace_id: &str);
    fn start_new_agent_draft(&self, workspace_id: &str);
    fn open_worktree_prompt(&self, workspace: &WorkspaceInfo);
    fn open_clone_prompt(&self, workspace: &WorkspaceInfo);
}

/// Blocking notification shown on failure.
pub trait AlertPresenter: Send + Sync {
    fn alert(&self, message: &str);
}

pub struct WorkspaceActionsParams {
    pub host: Arc<dyn WorkspaceHost>,
    pub shell: Arc<dyn WorkspaceShell>,
    pub alerts: Arc<dyn AlertPresenter>,
    pub debug: DebugSink,
    pub composer: ComposerRef,
    pub next_tick: DeferredQueue,
    pub new_agent_binding: KeyBinding,
}

pub struct WorkspaceActions {
    host: Arc<dyn WorkspaceHost>,
    shell: Arc<dyn WorkspaceShell>,
    alerts: Arc<dyn AlertPresenter>,
    debug: DebugSink,
    composer: ComposerRef,
    next_tick: DeferredQueue,
    shortcut: NewAgentShortcut,
    active_workspace: Option<WorkspaceInfo>,
    is_compact: bool,
}

impl WorkspaceActions {
    pub fn new(params: WorkspaceActionsParams) -> Self {
        Self {
            host: params.host,
            shell: params.shell,
            alerts: params.alerts,
            debug: params.debug,
            composer: params.composer,
            next_tick: params.next_tick,
            shortcut: NewAgentShortcut::new(params.new_agent_binding),
            active_workspace: None,
            is_compact: false,
        }
    }

    /// Updates the active workspace and layout; the new agent shortcut is only
    /// live while a workspace is active.
    pub fn set_context(&mut self, active_workspace: Option<WorkspaceInfo>, is_compact: bool) {
        self.shortcut.set_enabled(active_workspace.is_some());
        self.active_workspace = active_workspace;
        self.is_compact = is_compact;
    }

    pub fn shortcut_enabled(&self) -> bool {
        self.shortcut.is_enabled()
    }

    pub async fn handle_add_workspace(&self) {
        match self.host.add_workspace().await {
            Ok(Some(workspace)) => self.workspace_added(&workspace),
            Ok(None) => {}
            Err(error) => self.report_add_failure(&error),
        }
    }

    pub async fn handle_add_workspace_from_path(&self, path: &str) {
        match self.host.add_workspace_from_path(path).await {
            Ok(Some(workspace)) => self.workspace_added(&workspace),
            Ok(None) => {}
            Err(error) => self.report_add_failure(&error),
        }
    }

    pub fn handle_add_agent(&self, workspace: &WorkspaceInfo) {
        self.shell.exit_diff_view();
        self.shell.select_workspace(&workspace.id);
        self.shell.set_active_thread_id(None, &workspace.id);
        self.shell.start_new_agent_draft(&workspace.id);
        if self.is_compact {
            self.shell.set_active_tab(ShellTab::PRIMARY);
        }
        let composer = self.composer.clone();
        self.next_tick.schedule(move || {
            composer.focus();
        });
    }

    pub fn handle_add_worktree_agent(&self, workspace: &WorkspaceInfo) {
        self.shell.exit_diff_view();
        self.shell.open_worktree_prompt(workspace);
    }

    pub fn handle_add_clone_agent(&self, workspace: &WorkspaceInfo) {
        self.shell.exit_diff_view();
        self.shell.open_clone_prompt(workspace);
    }

    /// Runs "add agent" on the active workspace when `press` matches the
    /// binding. Returns whether the key was consumed.
    pub fn handle_key_press(&self, press: &KeyPress) -> bool {
        if !self.shortcut.triggers(press) {
            return false;
        }
        let Some(workspace) = self.active_workspace.as_ref() else {
            return false;
        };
        self.handle_add_agent(workspace);
        true
    }

    fn workspace_added(&self, workspace: &WorkspaceInfo) {
        self.shell.set_active_thread_id(None, &workspace.id);
        if self.is_compact {
            self.shell.set_active_tab(ShellTab::PRIMARY);
        }
    }

    fn report_add_failure(&self, error: &HostError) {
        let message = error.message();
        tracing::warn!(error = %message, "workspace/add failed");
        (self.debug)(DebugEntry::now(
            "client-add-workspace-error",
            DebugSource::Error,
            "workspace/add error",
            Value::String(message.clone()),
        ));
        self.alerts.alert(&format!("{ADD_WORKSPACE_FAILED}\n\n{message}"));
    }
}
