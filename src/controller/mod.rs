//! The desk controller.
//!
//! Owns the [`UiState`] view model and sequences backend calls for every user
//! action. Each action awaits its own calls in order; independent triggers
//! (pollers, push events, delayed restores) may interleave freely, so every
//! handler re-reads state after its awaits instead of caching it.

mod chat;
mod drives;
mod models;
mod tools;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{DeskConfig, TimingConfig};
use crate::host::api::{BackendApi, Outcome};
use crate::host::contract::{DOWNLOAD_PROGRESS_EVENT, EventEnvelope};
use crate::host::gateway::BackendGateway;
use crate::pollers::PollerHandle;
use crate::progress::DownloadProgressEvent;
use crate::runtime_probe::RuntimeTagsClient;
use crate::status::ConnectionState;
use crate::transcript::ChatMessage;
use crate::ui::panels::HomeStats;
use crate::ui::prompt::Prompter;
use crate::ui::views::ViewName;
use crate::ui::{UiState, UiUpdate};

const UPDATE_CAPACITY: usize = 256;

/// Front-end controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DeskController {
    inner: Arc<Inner>,
}

struct Inner {
    api: BackendApi,
    runtime: RuntimeTagsClient,
    timing: TimingConfig,
    prompter: Arc<dyn Prompter>,
    state: Mutex<UiState>,
    updates: broadcast::Sender<UiUpdate>,
    background: Mutex<Vec<PollerHandle>>,
    drive_poll: Mutex<Option<PollerHandle>>,
    event_pump: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pump) = self
            .event_pump
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pump.abort();
        }
    }
}

impl DeskController {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        config: &DeskConfig,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let (updates, _rx) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api: BackendApi::new(gateway),
                runtime: RuntimeTagsClient::new(&config.runtime),
                timing: config.timing.clone(),
                prompter,
                state: Mutex::new(UiState::default()),
                updates,
                background: Mutex::new(Vec::new()),
                drive_poll: Mutex::new(None),
                event_pump: Mutex::new(None),
            }),
        }
    }

    /// Receive a [`UiUpdate`] for every view-model change.
    pub fn subscribe(&self) -> broadcast::Receiver<UiUpdate> {
        self.inner.updates.subscribe()
    }

    /// A copy of the current view model.
    #[must_use]
    pub fn snapshot(&self) -> UiState {
        self.read(Clone::clone)
    }

    /// Run `f` against the current view model.
    pub fn read<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        let state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn publish(&self, update: UiUpdate) {
        // No subscribers is fine.
        let _ = self.inner.updates.send(update);
    }

    fn push_message(&self, message: ChatMessage) {
        self.mutate(|s| s.transcript.push(message.clone()));
        self.publish(UiUpdate::MessageAppended(message));
    }

    fn system_message(&self, text: impl Into<String>) {
        self.push_message(ChatMessage::system(text));
    }

    fn notice(&self, text: impl Into<String>) {
        self.publish(UiUpdate::Notice(text.into()));
    }

    fn api(&self) -> &BackendApi {
        &self.inner.api
    }

    fn prompter(&self) -> &dyn Prompter {
        self.inner.prompter.as_ref()
    }

    /// Run `f` once the display delay has passed.
    fn after_display_delay<F>(&self, f: F)
    where
        F: FnOnce(&DeskController) + Send + 'static,
    {
        let this = self.clone();
        let delay = self.inner.timing.display_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f(&this);
        });
    }

    /// Spawn a poller that stops once every controller clone is gone.
    fn spawn_poller<F, Fut>(&self, name: &'static str, period: Duration, tick: F) -> PollerHandle
    where
        F: Fn(DeskController) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        PollerHandle::spawn(name, period, move || {
            let run = weak.upgrade().map(|inner| tick(DeskController { inner }));
            async move {
                if let Some(run) = run {
                    run.await;
                }
            }
        })
    }

    /// Startup sequence, then the status and home-stats pollers.
    pub async fn start(&self) {
        info!("starting desk controller");
        self.listen_for_events();
        self.check_status().await;
        self.check_existing_drive_config().await;
        self.refresh_downloaded_state().await;
        self.update_home_stats().await;

        let timing = &self.inner.timing;
        let status = self.spawn_poller("status", timing.status_poll(), |c| async move {
            c.check_status().await;
        });
        let home = self.spawn_poller("home-stats", timing.home_stats(), |c| async move {
            c.update_home_stats().await;
        });
        let mut background = self
            .inner
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        background.clear();
        background.push(status);
        background.push(home);
    }

    /// Stop every background task.
    pub fn shutdown(&self) {
        info!("stopping desk controller");
        self.inner
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.stop_drive_poll();
        if let Some(pump) = self
            .inner
            .event_pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pump.abort();
        }
    }

    /// Subscribe to backend push events. Calling it again is a no-op.
    pub fn listen_for_events(&self) {
        let mut pump = self
            .inner
            .event_pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if pump.is_some() {
            return;
        }
        let mut events = self.api().gateway().subscribe_events();
        let weak = Arc::downgrade(&self.inner);
        *pump = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(envelope) => {
                        let Some(inner) = weak.upgrade() else { break };
                        DeskController { inner }.handle_event(envelope);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "backend event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("backend event stream closed");
                        break;
                    }
                }
            }
        }));
    }

    fn handle_event(&self, envelope: EventEnvelope) {
        if envelope.event != DOWNLOAD_PROGRESS_EVENT {
            debug!(event = %envelope.event, "ignoring backend event");
            return;
        }
        match serde_json::from_value::<DownloadProgressEvent>(envelope.payload) {
            Ok(event) => self.on_progress_event(&event),
            Err(e) => warn!(error = %e, "malformed download-progress payload"),
        }
    }

    /// Query runtime health and update the connection indicator.
    pub async fn check_status(&self) -> ConnectionState {
        let state = match self.api().check_status().await {
            Ok(status) => ConnectionState::from_status(status),
            Err(e) => {
                warn!(error = %e, "status check failed");
                ConnectionState::ErrorChecking
            }
        };
        self.mutate(|s| s.connection = state);
        self.publish(UiUpdate::Connection(state));
        state
    }

    /// Recompute the home view counters.
    pub async fn update_home_stats(&self) {
        self.refresh_downloaded_state().await;
        self.mutate(|s| s.home.downloaded_count = s.tracker.downloaded().len());

        let location = match self.api().get_models_location().await {
            Ok(Outcome::Success(config)) => Some(config),
            Ok(Outcome::Failure(_)) => None,
            Err(e) => {
                debug!(error = %e, "could not update home stats");
                self.publish(UiUpdate::Home);
                return;
            }
        };

        self.mutate(|s| {
            s.home.storage = HomeStats::storage_from(location.as_ref());
            s.home.active_model =
                HomeStats::active_model_label(s.selected_model(), s.tracker.downloaded());
        });
        self.publish(UiUpdate::Home);
    }

    /// The model-list refresh button.
    pub async fn refresh_models(&self) {
        self.load_downloaded_models().await;
        self.check_status().await;
        self.update_home_stats().await;
    }

    /// Activate a view and run its refresh. Unknown names are ignored.
    pub async fn switch_view(&self, name: &str) -> bool {
        let Some(switch) = self.mutate(|s| s.router.switch(name)) else {
            debug!(view = name, "unknown view");
            return false;
        };
        if switch.from == ViewName::Settings {
            self.stop_drive_poll();
        }
        self.publish(UiUpdate::View(switch.to));
        self.initialize_view(switch.to).await;
        true
    }

    async fn initialize_view(&self, view: ViewName) {
        match view {
            ViewName::Home => self.update_home_stats().await,
            ViewName::Chat => self.load_downloaded_models().await,
            ViewName::Models => {
                self.update_storage_banner().await;
                self.render_catalog().await;
            }
            ViewName::Settings => {
                self.check_existing_drive_config().await;
                // The user may have left settings while the location call ran.
                if !self.settings_open() {
                    debug!("settings closed before drive poll started");
                    return;
                }
                self.start_drive_poll();
                self.refresh_drives().await;
            }
            ViewName::Analyzer | ViewName::Coder => self.populate_model_selects().await,
        }
    }
}
