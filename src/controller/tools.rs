//! Analyzer and code assistant panels.

use tracing::warn;

use super::DeskController;
use crate::host::api::Outcome;
use crate::tools::{AnalyzerAction, CoderAction, ToolKind, ToolResult};
use crate::ui::UiUpdate;

impl DeskController {
    /// Run a document analysis with `model`.
    pub async fn analyze_text(&self, action: AnalyzerAction, text: &str, model: Option<&str>) {
        let text = text.trim();
        self.run_tool(ToolKind::Analyzer, text, model, || action.prompt(text))
            .await;
    }

    /// Run a code assistant request in `language` with `model`.
    pub async fn process_code(
        &self,
        action: CoderAction,
        language: &str,
        input: &str,
        model: Option<&str>,
    ) {
        let input = input.trim();
        self.run_tool(ToolKind::Coder, input, model, || action.prompt(language, input))
            .await;
    }

    async fn run_tool(
        &self,
        kind: ToolKind,
        input: &str,
        model: Option<&str>,
        prompt: impl FnOnce() -> String,
    ) {
        if input.is_empty() {
            self.prompter().alert(kind.missing_input_alert()).await;
            return;
        }
        let Some(model) = model.filter(|m| !m.is_empty()) else {
            self.prompter().alert(kind.missing_model_alert()).await;
            return;
        };

        self.mutate(|s| s.tool_mut(kind).result = ToolResult::Loading);
        self.publish(UiUpdate::Tool(kind));

        let result = match self.api().chat_message(&prompt(), model).await {
            Ok(Outcome::Success(reply)) => ToolResult::output(&reply.message),
            Ok(Outcome::Failure(failure)) => ToolResult::error(&failure.error),
            Err(e) => {
                warn!(error = %e, ?kind, "tool request failed");
                ToolResult::error(&e.user_message())
            }
        };
        self.mutate(|s| s.tool_mut(kind).result = result);
        self.publish(UiUpdate::Tool(kind));
    }
}
