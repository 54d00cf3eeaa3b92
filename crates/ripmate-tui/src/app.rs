//! Application orchestrator — event loop, action dispatch, screen wiring.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use ripmate_api::ApiClient;
use ripmate_core::{ClipboardMonitor, ClipboardWatcher, Notifier, SettingsForm, SettingsStore};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::picker::NativeDirectoryPicker;
use crate::screens::settings::SettingsScreen;
use crate::theme;
use crate::tui::Tui;

const TICK_RATE: Duration = Duration::from_millis(250);
const RENDER_RATE: Duration = Duration::from_millis(33);

/// Bridges the form controller's toast requests onto the action channel.
///
/// Toasts ride the ordinary action flow, so they expire on the same tick
/// cadence as everything else.
struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Action>,
}

impl Notifier for ChannelNotifier {
    fn show(&self, message: &str, duration: Duration) {
        let _ = self.tx.send(Action::Notify(Notification::new(
            message,
            NotificationLevel::Info,
            duration,
        )));
    }
}

pub struct App {
    screen: SettingsScreen,
    form: Arc<SettingsForm>,
    monitor: Arc<ClipboardMonitor>,
    api: Arc<ApiClient>,

    link_rx: Option<mpsc::UnboundedReceiver<String>>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,

    /// Active toast and when it was shown.
    notification: Option<(Notification, Instant)>,
    running: bool,
}

impl App {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (monitor, link_rx) = ClipboardMonitor::new();
        let monitor = Arc::new(monitor);

        let notifier = Arc::new(ChannelNotifier {
            tx: action_tx.clone(),
        });

        let form = Arc::new(SettingsForm::new(
            Arc::clone(&api) as Arc<dyn SettingsStore>,
            Arc::new(NativeDirectoryPicker),
            notifier,
            Arc::clone(&monitor) as Arc<dyn ClipboardWatcher>,
        ));

        Self {
            screen: SettingsScreen::new(Arc::clone(&form)),
            form,
            monitor,
            api,
            link_rx: Some(link_rx),
            action_tx,
            action_rx,
            notification: None,
            running: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        self.screen.init(self.action_tx.clone())?;
        self.spawn_initial_load();
        self.spawn_link_forwarder();

        let mut events = EventReader::new(TICK_RATE, RENDER_RATE);

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            let mut should_render = false;
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        let _ = self.action_tx.send(action);
                    }
                }
                Event::Resize(w, h) => {
                    let _ = self.action_tx.send(Action::Resize(w, h));
                }
                Event::Tick => {
                    let _ = self.action_tx.send(Action::Tick);
                }
                Event::Render => should_render = true,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if let Some(follow_up) = self.process_action(action)? {
                    let _ = self.action_tx.send(follow_up);
                }
            }

            if should_render && self.running {
                tui.draw(|frame| self.render(frame))?;
            }
        }

        info!("shutting down");
        self.form.teardown();
        self.monitor.shutdown();
        events.stop();
        tui.exit()?;

        Ok(())
    }

    /// Fetch the persisted record once at startup, then arm the clipboard
    /// watcher with it. A failed load leaves the watcher unarmed until the
    /// first successful save.
    fn spawn_initial_load(&self) {
        let form = Arc::clone(&self.form);
        let monitor = Arc::clone(&self.monitor);
        tokio::spawn(async move {
            form.load().await;
            if let Ok(settings) = form.state().merged() {
                monitor.reinitialize(&settings);
            }
        });
    }

    /// Forward harvested clipboard link batches into the action loop.
    fn spawn_link_forwarder(&mut self) {
        let Some(mut link_rx) = self.link_rx.take() else {
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            while let Some(links) = link_rx.recv().await {
                if tx.send(Action::LinksHarvested(links)).is_err() {
                    break;
                }
            }
        });
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }
        self.screen.handle_key_event(key)
    }

    fn process_action(&mut self, action: Action) -> Result<Option<Action>> {
        match &action {
            Action::Quit => {
                self.running = false;
            }
            Action::Tick => {
                if let Some((notification, shown_at)) = &self.notification {
                    if shown_at.elapsed() >= notification.duration {
                        return Ok(Some(Action::DismissNotification));
                    }
                }
            }
            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }
            Action::DismissNotification => {
                self.notification = None;
            }
            Action::LinksHarvested(links) => {
                self.submit_links(links.clone());
            }
            Action::Render | Action::Resize(..) => {}
        }

        self.screen.update(&action)
    }

    /// Post a harvested link batch to the server, toasting the outcome.
    fn submit_links(&self, links: String) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let count = links.lines().count();
            debug!(count, "submitting clipboard links");
            match api.post_links(&links).await {
                Ok(()) => {
                    let noun = if count == 1 { "link" } else { "links" };
                    let _ = tx.send(Action::Notify(Notification::info(format!(
                        "Sent {count} clipboard {noun} to the server"
                    ))));
                }
                Err(err) => {
                    warn!(error = %err, "clipboard link submission failed");
                    let _ = tx.send(Action::Notify(Notification::error(err.user_message())));
                }
            }
        });
    }

    fn render(&self, frame: &mut Frame) {
        let layout =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(frame.area());

        self.screen.render(frame, layout[0]);

        if let Some((notification, _)) = &self.notification {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {}", notification.message),
                    theme::toast(notification.level),
                )),
                layout[1],
            );
        }
    }
}
