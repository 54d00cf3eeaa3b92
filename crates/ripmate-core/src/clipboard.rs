//! Clipboard monitor — watches the desktop clipboard for gallery links.
//!
//! The monitor is the production [`ClipboardWatcher`]: after every
//! successful settings save the form controller calls
//! [`reinitialize`](ClipboardWatcher::reinitialize) with the fresh record,
//! which tears down the current watch task and starts a new one when
//! `desktop_clipboard` is enabled. Harvested links are forwarded as
//! newline-joined batches through an unbounded channel; the host decides
//! what to do with them (the TUI hands them to the backend's link endpoint).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ripmate_api::Settings;

use crate::form::ClipboardWatcher;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Extract `http(s)` URLs from clipboard text, in order of appearance.
pub fn extract_links(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
        .map(str::to_owned)
        .collect()
}

/// Where the watch task reads clipboard text from. `None` means the read
/// failed or nothing textual is on the clipboard.
trait ClipboardSource: Send + 'static {
    fn read_text(&mut self) -> Option<String>;
}

struct SystemClipboard(arboard::Clipboard);

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        self.0.get_text().ok()
    }
}

/// Polls the system clipboard once per second while watching is enabled.
///
/// Idle until the first `reinitialize`. Each reinitialization cancels the
/// previous watch task through a child token (so a permanent shutdown token
/// stays intact) before optionally spawning a fresh one.
pub struct ClipboardMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    cancel: CancellationToken,
    watch_cancel: Mutex<CancellationToken>,
    link_tx: mpsc::UnboundedSender<String>,
}

impl ClipboardMonitor {
    /// Create the monitor and the receiving end of its link channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let watch_cancel = Mutex::new(cancel.child_token());
        (
            Self {
                inner: Arc::new(MonitorInner {
                    cancel,
                    watch_cancel,
                    link_tx,
                }),
            },
            link_rx,
        )
    }

    /// Stop watching permanently.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Cancel the current watch task and hand out a fresh child token.
    fn swap_watch_token(&self) -> CancellationToken {
        let mut guard = self
            .inner
            .watch_cancel
            .lock()
            .expect("watch token lock poisoned");
        guard.cancel();
        let fresh = self.inner.cancel.child_token();
        *guard = fresh.clone();
        fresh
    }
}

impl ClipboardWatcher for ClipboardMonitor {
    /// Re-arm the watcher with freshly saved settings.
    ///
    /// Must be called from within a tokio runtime.
    fn reinitialize(&self, settings: &Settings) {
        let token = self.swap_watch_token();
        if !settings.desktop_clipboard {
            debug!("clipboard watch disabled");
            return;
        }
        let tx = self.inner.link_tx.clone();
        tokio::spawn(watch_clipboard(token, tx));
    }
}

async fn watch_clipboard(cancel: CancellationToken, tx: mpsc::UnboundedSender<String>) {
    let clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            warn!(error = %e, "clipboard unavailable, watch disabled");
            return;
        }
    };
    watch_loop(SystemClipboard(clipboard), cancel, tx).await;
}

async fn watch_loop<S: ClipboardSource>(
    mut source: S,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<String>,
) {
    // Whatever is on the clipboard at startup is old news.
    let mut last_text = source.read_text().unwrap_or_default();

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    debug!("clipboard watch started");
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            _ = interval.tick() => {
                let Some(text) = source.read_text() else { continue };
                let Some(batch) = harvest_batch(&mut last_text, text) else { continue };
                if tx.send(batch).is_err() {
                    break;
                }
            }
        }
    }
    debug!("clipboard watch stopped");
}

/// One poll step: skip text already seen, remember the new text, and
/// return the newline-joined links when there are any.
fn harvest_batch(last_text: &mut String, text: String) -> Option<String> {
    if text == *last_text {
        return None;
    }
    let links = extract_links(&text);
    *last_text = text;
    if links.is_empty() {
        return None;
    }
    debug!(count = links.len(), "harvested clipboard links");
    Some(links.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    /// Replays a fixed sequence of clipboard reads; the final entry then
    /// repeats forever, like a clipboard nobody touches again.
    struct ScriptedClipboard {
        reads: VecDeque<String>,
    }

    impl ScriptedClipboard {
        fn new(reads: &[&str]) -> Self {
            Self {
                reads: reads.iter().map(|s| (*s).to_string()).collect(),
            }
        }
    }

    impl ClipboardSource for ScriptedClipboard {
        fn read_text(&mut self) -> Option<String> {
            if self.reads.len() > 1 {
                self.reads.pop_front()
            } else {
                self.reads.front().cloned()
            }
        }
    }

    #[test]
    fn extracts_urls_in_order() {
        let text = "look at https://example.com/a\nand http://example.com/b too";
        assert_eq!(
            extract_links(text),
            vec!["https://example.com/a", "http://example.com/b"]
        );
    }

    #[test]
    fn ignores_text_without_urls() {
        assert!(extract_links("no links here, just prose").is_empty());
        assert!(extract_links("").is_empty());
    }

    #[test]
    fn ignores_bare_hostnames() {
        assert!(extract_links("example.com www.example.com httpx://nope").is_empty());
    }

    #[test]
    fn unchanged_text_is_not_reharvested() {
        let mut last = String::new();
        assert_eq!(
            harvest_batch(&mut last, "https://example.com/a".into()),
            Some("https://example.com/a".into())
        );
        assert_eq!(harvest_batch(&mut last, "https://example.com/a".into()), None);
        assert_eq!(
            harvest_batch(&mut last, "https://example.com/b".into()),
            Some("https://example.com/b".into())
        );
    }

    #[test]
    fn linkless_change_still_updates_the_baseline() {
        let mut last = "https://example.com/a".to_string();
        assert_eq!(harvest_batch(&mut last, "just prose".into()), None);
        assert_eq!(last, "just prose");
    }

    #[tokio::test(start_paused = true)]
    async fn startup_text_is_skipped_and_changes_emit_exactly_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let source = ScriptedClipboard::new(&[
            "https://example.com/seeded", // startup snapshot, never harvested
            "https://example.com/seeded", // first poll: unchanged
            "https://example.com/a prose https://example.com/b",
            "https://example.com/a prose https://example.com/b", // repeats forever
        ]);

        tokio::spawn(watch_loop(source, cancel.clone(), tx));

        // The only batch is the changed text, not the seeded link.
        let batch = rx.recv().await;
        assert_eq!(
            batch.as_deref(),
            Some("https://example.com/a\nhttps://example.com/b")
        );

        // Further polls of the identical text emit nothing.
        tokio::time::sleep(POLL_INTERVAL * 5).await;
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn reinitialize_with_watching_disabled_spawns_nothing() {
        let (monitor, mut rx) = ClipboardMonitor::new();

        monitor.reinitialize(&Settings::default());
        monitor.shutdown();

        // Channel closes once the monitor's sender is the only one left and
        // no task was spawned to hold a clone.
        drop(monitor);
        assert!(rx.recv().await.is_none());
    }
}
