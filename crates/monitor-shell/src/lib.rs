//! UI-state glue for the monitor desktop shell.
//!
//! Each module owns one piece of presentation state the shell keeps between
//! host IPC calls: composer text insertion, the new agent draft lifecycle,
//! workspace actions, and the installed apps list.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod apps;
pub mod composer;
pub mod config;
pub mod debug_log;
pub mod deferred;
pub mod draft;
pub mod error;
pub mod shortcut;
pub mod single_flight;
pub mod types;
pub mod workspace_actions;

pub use apps::{AppListHost, AppsFetcher, normalize_apps_response};
pub use composer::{
    ComposerInsert, ComposerRef, ComposerSplice, ComposerTextarea, SelectionRange, splice_insert,
};
pub use config::ShellConfig;
pub use debug_log::{DebugLog, DebugSink};
pub use deferred::{DeferredQueue, UiScheduler};
pub use draft::NewAgentDraft;
pub use error::{ConfigError, HostError, ShortcutParseError};
pub use shortcut::{KeyBinding, KeyPress, Modifiers, NewAgentShortcut};
pub use single_flight::{Admission, SingleFlight};
pub use types::{
    AppOption, AppsListParams, DebugEntry, DebugSource, ShellTab, WorkspaceInfo,
    WorkspaceSettings,
};
pub use workspace_actions::{
    AlertPresenter, WorkspaceActions, WorkspaceActionsParams, WorkspaceHost, WorkspaceShell,
};
