//! Shared records exchanged with the host shell.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    #[serde(default)]
    pub sidebar_collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub settings: WorkspaceSettings,
}

/// Normalized entry of the installed apps list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_accessible: bool,
    #[serde(default)]
    pub install_url: Option<String>,
    #[serde(default)]
    pub distribution_channel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppsListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugSource {
    Client,
    Server,
    Error,
}

impl DebugSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub source: DebugSource,
    pub label: String,
    pub payload: Value,
}

impl DebugEntry {
    /// Stamps a new entry with the current wall clock; `slug` becomes the id suffix.
    pub fn now(
        slug: &str,
        source: DebugSource,
        label: impl Into<String>,
        payload: impl Into<Value>,
    ) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        Self {
            id: format!("{timestamp}-{slug}"),
            timestamp,
            source,
            label: label.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellTab {
    Projects,
    Codex,
    Git,
    Log,
}

impl ShellTab {
    /// Tab compact layouts switch to when work starts in a workspace.
    pub const PRIMARY: Self = Self::Codex;

    pub const fn label(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Codex => "codex",
            Self::Git => "git",
            Self::Log => "log",
        }
    }
}
