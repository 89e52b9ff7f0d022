//! Model inventory, catalog cards and downloads.

use tracing::{debug, info, warn};

use super::DeskController;
use crate::catalog::{build_cards, card_key, find_variant};
use crate::host::api::Outcome;
use crate::progress::{DownloadProgressEvent, ProgressStatus, progress_element_id};
use crate::tools::ToolKind;
use crate::ui::UiUpdate;
use crate::ui::panels::ModelSelector;

impl DeskController {
    /// Reload the downloaded set from the backend, or from the runtime
    /// directly when the backend cannot answer.
    pub async fn refresh_downloaded_state(&self) {
        let names: Option<Vec<String>> = match self.api().get_downloaded_models().await {
            Ok(Outcome::Success(models)) => Some(models.into_iter().map(|m| m.name).collect()),
            Ok(Outcome::Failure(failure)) => {
                debug!(error = %failure.error, "backend has no downloaded list; asking the runtime");
                self.runtime_model_names().await
            }
            Err(e) => {
                warn!(error = %e, "get-downloaded-models failed; asking the runtime");
                self.runtime_model_names().await
            }
        };
        if let Some(names) = names {
            self.mutate(|s| s.tracker.replace_downloaded(names));
        }
    }

    async fn runtime_model_names(&self) -> Option<Vec<String>> {
        match self.inner.runtime.list_model_names().await {
            Ok(names) => Some(names),
            Err(e) => {
                debug!(error = %e, url = self.inner.runtime.endpoint_url(), "could not check downloaded models");
                None
            }
        }
    }

    /// Rebuild the chat dropdown from the downloaded list.
    pub async fn load_downloaded_models(&self) {
        match self.api().get_downloaded_models().await {
            Ok(Outcome::Success(models)) => {
                self.mutate(|s| {
                    let selector = ModelSelector::from_downloaded(&models, s.selected_model());
                    s.set_selector(selector);
                    s.downloaded_models = models;
                });
                self.publish(UiUpdate::Selector);
                self.publish(UiUpdate::DownloadedModels);
            }
            Ok(Outcome::Failure(failure)) if failure.requires_external_drive => {
                self.mutate(|s| {
                    s.set_selector(ModelSelector::external_drive_required());
                    s.home.active_model = "External Drive Required".to_owned();
                });
                self.publish(UiUpdate::Selector);
                self.publish(UiUpdate::Home);
            }
            Ok(Outcome::Failure(failure)) => {
                debug!(error = %failure.error, "get-downloaded-models refused");
                self.mutate(|s| s.set_selector(ModelSelector::load_error()));
                self.publish(UiUpdate::Selector);
            }
            Err(e) => {
                warn!(error = %e, "failed to load downloaded models");
                self.mutate(|s| s.set_selector(ModelSelector::load_error()));
                self.publish(UiUpdate::Selector);
            }
        }
    }

    /// Fill the dropdown with every model the runtime knows, selecting the
    /// first.
    pub async fn load_models(&self) {
        let selector = match self.api().get_models().await {
            Ok(Outcome::Success(names)) => ModelSelector::from_names(&names),
            Ok(Outcome::Failure(_)) => ModelSelector::from_names(&[]),
            Err(e) => {
                warn!(error = %e, "failed to load models");
                ModelSelector::load_error()
            }
        };
        self.mutate(|s| s.set_selector(selector));
        self.publish(UiUpdate::Selector);
    }

    /// Re-render the catalog cards against a fresh downloaded set.
    pub async fn render_catalog(&self) {
        self.refresh_downloaded_state().await;
        self.mutate(|s| {
            s.cards = build_cards(&s.tracker);
            s.progress.rebuild(&s.cards, &s.tracker);
        });
        self.publish(UiUpdate::Cards);
    }

    fn refresh_cards(&self) {
        self.mutate(|s| s.cards = build_cards(&s.tracker));
        self.publish(UiUpdate::Cards);
    }

    /// Download one catalog variant from its card.
    ///
    /// Returns `false` without calling the backend when the card is not
    /// rendered or is already downloading or downloaded.
    pub async fn download(&self, base_name: &str, variant: &str) -> bool {
        let key = card_key(base_name, variant);
        if find_variant(base_name, variant).is_none() {
            debug!(model = %key, "not a catalog model");
            return false;
        }
        let progress_id = progress_element_id(&key);

        let started = self.mutate(|s| {
            if !s.cards.iter().any(|card| card.key == key) {
                return false;
            }
            if !s.tracker.start(&key) {
                return false;
            }
            s.progress.show_starting(&progress_id);
            true
        });
        if !started {
            debug!(model = %key, "download not available for this card");
            return false;
        }
        info!(model = %key, "starting download");
        self.refresh_cards();
        self.publish(UiUpdate::Progress(progress_id.clone()));

        match self.api().download_model(base_name, variant).await {
            Ok(Outcome::Success(())) => {
                self.mutate(|s| s.tracker.complete(&key));
                self.refresh_cards();
                self.system_message(format!(
                    "Successfully downloaded {key}! You can now select it from the model dropdown."
                ));
                self.load_downloaded_models().await;
                self.render_catalog().await;
            }
            Ok(Outcome::Failure(failure)) => {
                self.mutate(|s| s.tracker.fail(&key));
                self.refresh_cards();
                self.system_message(format!("Failed to download {key}: {}", failure.error));
            }
            Err(e) => {
                warn!(error = %e, model = %key, "download-model failed");
                self.mutate(|s| s.tracker.fail(&key));
                self.refresh_cards();
                self.system_message(format!("Download error for {key}: {}", e.user_message()));
            }
        }

        self.after_display_delay(move |controller| {
            controller.mutate(|s| {
                s.tracker.clear(&key);
                s.progress.hide(&progress_id);
            });
            controller.refresh_cards();
            controller.publish(UiUpdate::Progress(progress_id));
        });
        true
    }

    /// Apply a `download-progress` push event to its card's progress slot.
    /// Events for cards that are not rendered are dropped, as are non-final
    /// events for a model whose download already finished.
    pub fn on_progress_event(&self, event: &DownloadProgressEvent) {
        let settled = self.read(|s| {
            s.tracker.is_downloaded(&event.model) && !s.tracker.is_downloading(&event.model)
        });
        if settled && event.status != ProgressStatus::Completed {
            debug!(model = %event.model, status = ?event.status, "late progress for finished download; dropping");
            return;
        }
        let Some(id) = self.mutate(|s| s.progress.apply(event)) else {
            debug!(model = %event.model, "no progress element for event; dropping");
            return;
        };
        self.publish(UiUpdate::Progress(id.clone()));

        if event.status == ProgressStatus::Completed {
            self.after_display_delay(move |controller| {
                if controller.mutate(|s| s.progress.hide(&id)) {
                    controller.publish(UiUpdate::Progress(id));
                }
            });
        }
    }

    /// Select a downloaded model for chat.
    pub fn use_model(&self, model: &str) {
        self.mutate(|s| {
            s.selector.select_or_insert(model);
            s.session.select_model(model);
        });
        self.publish(UiUpdate::Selector);
        self.system_message(format!("Switched to {model}"));
    }

    /// Delete a downloaded model after confirmation. Returns whether the
    /// backend deleted it.
    pub async fn delete_model(&self, model: &str) -> bool {
        let question = format!(
            "Are you sure you want to delete {model}? This will free up space on your external drive."
        );
        if !self.prompter().confirm(&question).await {
            return false;
        }
        match self.api().delete_model(model).await {
            Ok(Outcome::Success(())) => {
                self.load_downloaded_models().await;
                self.load_models().await;
                self.system_message(format!("Deleted model {model}"));
                true
            }
            Ok(Outcome::Failure(failure)) => {
                self.prompter()
                    .alert(&format!("Failed to delete model: {}", failure.error))
                    .await;
                false
            }
            Err(e) => {
                self.prompter()
                    .alert(&format!("Error deleting model: {}", e.user_message()))
                    .await;
                false
            }
        }
    }

    /// Ask the backend to reveal the models folder.
    pub async fn open_models_location(&self) {
        match self.api().open_models_location().await {
            Ok(Outcome::Success(path)) => self.notice(format!("📁 Opened: {path}")),
            Ok(Outcome::Failure(failure)) => {
                self.prompter()
                    .alert(&format!("Failed to open models location: {}", failure.error))
                    .await;
            }
            Err(e) => {
                self.prompter()
                    .alert(&format!("Error opening models location: {}", e.user_message()))
                    .await;
            }
        }
    }

    /// Offer the downloaded set in both tool panels.
    pub async fn populate_model_selects(&self) {
        self.refresh_downloaded_state().await;
        self.mutate(|s| {
            let models = s.tracker.downloaded().to_vec();
            s.analyzer.models = models.clone();
            s.coder.models = models;
        });
        self.publish(UiUpdate::Tool(ToolKind::Analyzer));
        self.publish(UiUpdate::Tool(ToolKind::Coder));
    }
}
