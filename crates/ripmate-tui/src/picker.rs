//! Native directory-picker adapter.

use std::path::PathBuf;

use ripmate_core::DirectoryPicker;

/// Opens the host OS directory chooser via `rfd`.
///
/// The call blocks the UI thread until the dialog is dismissed, matching
/// the modal semantics of the settings screen's Browse action.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDirectoryPicker;

impl DirectoryPicker for NativeDirectoryPicker {
    fn pick_folder(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Choose download folder")
            .pick_folder()
    }
}
