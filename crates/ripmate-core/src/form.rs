//! The settings form controller.
//!
//! Owns the two screen-local edit buffers (general and desktop groups) and
//! the collaborators injected by the host UI. The buffers are transient
//! working copies of the server's authoritative [`Settings`] record: every
//! successful load or save replaces them wholesale and marks them clean.
//!
//! All backend failures are terminal to the attempt. Load failures are only
//! logged; save failures surface the server's message through the
//! [`Notifier`] while the user's edits are preserved for a manual retry.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ripmate_api::{ApiClient, Error, Settings};

/// Display duration for save-result toasts.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

// ── Collaborator traits ──────────────────────────────────────────────

/// Read/write access to the backend settings endpoint.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, Error>;

    /// Persist an edited record; returns the authoritative, possibly
    /// normalized record the server stored.
    async fn save(&self, settings: &Settings) -> Result<Settings, Error>;
}

#[async_trait]
impl SettingsStore for ApiClient {
    async fn load(&self) -> Result<Settings, Error> {
        self.get_settings().await
    }

    async fn save(&self, settings: &Settings) -> Result<Settings, Error> {
        self.post_settings(settings).await
    }
}

/// Host-provided modal directory chooser.
pub trait DirectoryPicker: Send + Sync {
    /// Open the dialog, configured for directory selection only. Blocks the
    /// calling interaction until dismissed; `None` means the user cancelled.
    fn pick_folder(&self) -> Option<PathBuf>;
}

/// Transient banner display. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, duration: Duration);
}

/// The clipboard-monitoring collaborator, re-armed after every save.
pub trait ClipboardWatcher: Send + Sync {
    fn reinitialize(&self, settings: &Settings);
}

// ── Edit buffers ─────────────────────────────────────────────────────

/// Edit buffer for the general settings group.
///
/// `max_threads` is held as free text (it is typed into a plain input
/// field) and parsed on submit. `dirty` and `touched` are presentation
/// state only, reset after every successful load or save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralForm {
    pub download_path: String,
    pub max_threads: String,
    pub auto_start: bool,
    pub v_login: bool,
    pub v_username: String,
    pub v_password: String,
    pub v_thanks: bool,
    pub dirty: bool,
    pub touched: bool,
}

impl GeneralForm {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            download_path: settings.download_path.clone(),
            max_threads: settings.max_threads.to_string(),
            auto_start: settings.auto_start,
            v_login: settings.v_login,
            v_username: settings.v_username.clone(),
            v_password: settings.v_password.clone(),
            v_thanks: settings.v_thanks,
            dirty: false,
            touched: false,
        }
    }
}

/// Edit buffer for the desktop-specific settings group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopForm {
    pub desktop_clipboard: bool,
    pub dirty: bool,
    pub touched: bool,
}

impl DesktopForm {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            desktop_clipboard: settings.desktop_clipboard,
            dirty: false,
            touched: false,
        }
    }
}

/// Both edit buffers. Cloned out for rendering, mutated through
/// [`SettingsForm::edit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub general: GeneralForm,
    pub desktop: DesktopForm,
}

impl FormState {
    fn reset_to(&mut self, settings: &Settings) {
        self.general = GeneralForm::from_settings(settings);
        self.desktop = DesktopForm::from_settings(settings);
    }

    /// Merge both buffers into one flat payload. The two field sets are
    /// disjoint, so the union is unambiguous.
    pub fn merged(&self) -> Result<Settings, String> {
        let max_threads = self
            .general
            .max_threads
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid thread count: {}", self.general.max_threads))?;

        Ok(Settings {
            download_path: self.general.download_path.clone(),
            max_threads,
            auto_start: self.general.auto_start,
            v_login: self.general.v_login,
            v_username: self.general.v_username.clone(),
            v_password: self.general.v_password.clone(),
            v_thanks: self.general.v_thanks,
            desktop_clipboard: self.desktop.desktop_clipboard,
        })
    }

    /// Whether either buffer holds unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.general.dirty || self.desktop.dirty
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// The settings form controller.
///
/// Interior-mutable so the host UI can share it (`Arc<SettingsForm>`)
/// between its render loop and the tasks driving [`load`](Self::load) and
/// [`submit`](Self::submit). Load and submit carry no mutual exclusion --
/// the last response to resolve wins, which is accepted for this
/// single-user screen. [`teardown`](Self::teardown) is the liveness guard:
/// once called, late responses mutate nothing and notify nobody.
pub struct SettingsForm {
    state: Mutex<FormState>,
    store: Arc<dyn SettingsStore>,
    picker: Arc<dyn DirectoryPicker>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn ClipboardWatcher>,
    alive: CancellationToken,
}

impl SettingsForm {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        picker: Arc<dyn DirectoryPicker>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn ClipboardWatcher>,
    ) -> Self {
        Self {
            state: Mutex::new(FormState::default()),
            store,
            picker,
            notifier,
            clipboard,
            alive: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().expect("form state lock poisoned")
    }

    /// Snapshot of both buffers, for rendering.
    pub fn state(&self) -> FormState {
        self.lock().clone()
    }

    /// Mutate the buffers from the UI. The closure is responsible for
    /// setting the dirty/touched flags of the group it edits.
    pub fn edit(&self, f: impl FnOnce(&mut FormState)) {
        f(&mut self.lock());
    }

    /// Mark the owning screen as torn down. Pending loads and submits that
    /// resolve afterwards are discarded.
    pub fn teardown(&self) {
        self.alive.cancel();
    }

    /// Fetch the persisted record and reset both buffers to it.
    ///
    /// On failure the error is logged and the buffers keep their prior
    /// values -- no retry, nothing shown to the user.
    pub async fn load(&self) {
        match self.store.load().await {
            Ok(settings) => {
                if self.alive.is_cancelled() {
                    return;
                }
                debug!("settings loaded");
                self.lock().reset_to(&settings);
            }
            Err(e) => warn!(error = %e, "failed to load settings"),
        }
    }

    /// Open the directory chooser and copy the selection into the
    /// download-path field. Cancellation leaves the buffer untouched.
    pub fn browse(&self) {
        let Some(path) = self.picker.pick_folder() else {
            return;
        };
        let mut state = self.lock();
        state.general.download_path = path.display().to_string();
        state.general.dirty = true;
        state.general.touched = true;
    }

    /// Merge both buffers and write them to the backend.
    ///
    /// Success: toast, reset buffers to the server's returned record, re-arm
    /// the clipboard watcher with it. Failure: toast with the server's
    /// message, buffers left exactly as the user last edited them.
    pub async fn submit(&self) {
        let payload = match self.lock().merged() {
            Ok(payload) => payload,
            Err(message) => {
                // Unparseable thread count never reaches the wire.
                self.notifier.show(&message, TOAST_DURATION);
                return;
            }
        };

        match self.store.save(&payload).await {
            Ok(saved) => {
                if self.alive.is_cancelled() {
                    return;
                }
                self.lock().reset_to(&saved);
                self.notifier.show("Settings updated", TOAST_DURATION);
                self.clipboard.reinitialize(&saved);
            }
            Err(e) => {
                if self.alive.is_cancelled() {
                    return;
                }
                warn!(error = %e, "failed to save settings");
                self.notifier.show(&e.user_message(), TOAST_DURATION);
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
