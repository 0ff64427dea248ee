//! Installed apps list for the active workspace.

mod fetcher;
mod normalize;

pub use fetcher::{AppListHost, AppsFetcher};
pub use normalize::{compare_apps, normalize_apps_response};
