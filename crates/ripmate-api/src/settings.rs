//! The persisted server settings record.

use serde::{Deserialize, Serialize};

/// The application's configuration record, owned authoritatively by the
/// backend store. The UI only ever holds a working copy of this, replaced
/// wholesale on every successful read or write response.
///
/// Field names follow the backend's JSON wire format (`vLogin`, `vUsername`,
/// etc. are the forum-site credentials).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Destination directory for finished downloads.
    pub download_path: String,

    /// Maximum concurrent download threads.
    pub max_threads: u32,

    /// Start queued downloads automatically.
    pub auto_start: bool,

    /// Whether to log into the forum site.
    pub v_login: bool,

    /// Forum site username.
    pub v_username: String,

    /// Forum site password.
    pub v_password: String,

    /// Leave a "thanks" on the source thread when a download completes.
    pub v_thanks: bool,

    /// Watch the desktop clipboard for gallery links.
    pub desktop_clipboard: bool,
}
