//! Business logic between `ripmate-api` and UI consumers.
//!
//! - **[`SettingsForm`]** — the settings form controller: owns the two
//!   screen-local edit buffers, loads the persisted record from the backend,
//!   and submits merged edits back. Collaborators are injected through
//!   narrow capability traits so hosts (and tests) can substitute their own.
//!
//! - **[`ClipboardMonitor`]** — production [`ClipboardWatcher`]: polls the
//!   desktop clipboard for gallery links while enabled, re-armed with fresh
//!   settings after every successful save.

pub mod clipboard;
pub mod form;

pub use clipboard::{ClipboardMonitor, extract_links};
pub use form::{
    ClipboardWatcher, DesktopForm, DirectoryPicker, FormState, GeneralForm, Notifier,
    SettingsForm, SettingsStore, TOAST_DURATION,
};

// Re-export the API types consumers handle directly.
pub use ripmate_api::{Error, Settings};
