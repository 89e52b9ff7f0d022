//! Chat send path.

use tokio::time::Instant;
use tracing::{debug, warn};

use super::DeskController;
use crate::commands::{self, ChatCommand};
use crate::host::api::Outcome;
use crate::transcript::{ChatMessage, MessageMetadata};
use crate::ui::{TypingIndicator, UiUpdate};

impl DeskController {
    /// Handle one line of chat input.
    ///
    /// Empty input, and input while a request is in flight, are ignored.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.mutate(|s| s.session.begin_request()) {
            debug!("chat request already in flight; ignoring send");
            return;
        }
        self.send_claimed(text).await;
        self.mutate(|s| s.session.end_request());
    }

    async fn send_claimed(&self, text: &str) {
        let Some(model) = self.read(|s| s.selected_model().map(str::to_owned)) else {
            self.system_message(commands::SELECT_MODEL_FIRST);
            return;
        };

        self.push_message(ChatMessage::user(text));

        match commands::parse_command(text) {
            ChatCommand::SwitchModel(word) => self.switch_by_phrase(&word).await,
            ChatCommand::Clear => self.clear_conversation(&model).await,
            ChatCommand::History => self.report_history(&model).await,
            ChatCommand::Help => self.system_message(commands::HELP_TEXT),
            ChatCommand::Forward => self.generate(text, &model).await,
        }
    }

    async fn switch_by_phrase(&self, word: &str) {
        let candidates = self.read(|s| s.selector.candidates());
        let Some(model) = commands::resolve_model(word, &candidates).map(str::to_owned) else {
            self.system_message(commands::model_not_found_message(word, &candidates));
            return;
        };
        self.mutate(|s| {
            s.selector.selected = Some(model.clone());
            s.session.select_model(model.clone());
        });
        self.publish(UiUpdate::Selector);
        self.system_message(commands::switched_message(&model));
        self.update_home_stats().await;
    }

    async fn clear_conversation(&self, model: &str) {
        match self.api().clear_conversation(model).await {
            Ok(Outcome::Success(())) => self.system_message(commands::cleared_message(model)),
            Ok(Outcome::Failure(failure)) => {
                self.system_message(commands::clear_failed_message(&failure.error));
            }
            Err(e) => {
                warn!(error = %e, model, "clear-conversation failed");
                self.system_message(commands::clear_failed_message(&e.user_message()));
            }
        }
    }

    async fn report_history(&self, model: &str) {
        match self.api().get_conversation_history(model).await {
            Ok(Outcome::Success(history)) if !history.is_empty() => {
                self.system_message(commands::history_message(history.len()));
            }
            Ok(_) => self.system_message(commands::NO_HISTORY),
            Err(e) => {
                warn!(error = %e, model, "get-conversation-history failed");
                self.system_message(commands::history_failed_message(&e.user_message()));
            }
        }
    }

    async fn generate(&self, text: &str, model: &str) {
        self.mutate(|s| {
            s.typing = Some(TypingIndicator {
                model: model.to_owned(),
            });
        });
        self.publish(UiUpdate::Typing(true));

        let started = Instant::now();
        let result = self.api().chat_message(text, model).await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.mutate(|s| s.typing = None);
        self.publish(UiUpdate::Typing(false));

        match result {
            Ok(Outcome::Success(reply)) => self.push_message(ChatMessage::assistant(
                reply.message,
                MessageMetadata {
                    model_name: model.to_owned(),
                    response_time_ms,
                    token_count: reply.tokens,
                },
            )),
            Ok(Outcome::Failure(failure)) if failure.requires_external_drive => {
                self.system_message(commands::EXTERNAL_STORAGE_REQUIRED);
            }
            Ok(Outcome::Failure(failure)) => {
                self.system_message(commands::generation_error_message(&failure.error));
                if let Some(hint) = commands::generation_error_hint(&failure.error) {
                    self.system_message(hint);
                }
            }
            Err(e) => {
                warn!(error = %e, model, "chat-message failed");
                self.system_message(commands::unexpected_error_message(&e.user_message()));
            }
        }
    }

    /// Pick a model from the chat dropdown. Returns `false` when it is not
    /// offered.
    pub async fn select_model(&self, model: &str) -> bool {
        let offered = self.mutate(|s| {
            if !s.selector.contains(model) {
                return false;
            }
            s.selector.selected = Some(model.to_owned());
            s.session.select_model(model);
            true
        });
        if !offered {
            debug!(model, "model not in selector");
            return false;
        }
        self.publish(UiUpdate::Selector);
        self.update_home_stats().await;
        true
    }
}
