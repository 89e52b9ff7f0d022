//! Chat input interpretation.
//!
//! [`parse_command`] is pure: it decides what a line of chat input means. The
//! controller performs the backend calls and uses the message builders here
//! for every system reply, so wording stays in one place.

/// What a line of chat input asks for. First match wins, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `use <word>`, `switch to <word>` or `load <word>` at the start of the
    /// input. Carries the lowercased word.
    SwitchModel(String),
    Clear,
    History,
    Help,
    /// Anything else goes to the model as a generation request.
    Forward,
}

const SWITCH_VERBS: [&str; 3] = ["use", "switch to", "load"];

pub const SELECT_MODEL_FIRST: &str = "Please select a model first.";
pub const EXTERNAL_STORAGE_REQUIRED: &str =
    "⚙️ External storage required. Please configure in Settings.";
pub const NO_HISTORY: &str = "📭 No conversation history yet";

pub const HELP_TEXT: &str = "🤖 **Chat Commands:**
• `/clear` - Clear conversation history
• `/history` - Show conversation stats
• `use [model]` - Switch to a different model
• `/help` - Show this help

💡 **Tips for better responses:**
• Be specific and clear in your questions
• Provide context for complex topics
• Use follow-up questions to dive deeper
• Try different phrasings if you don't get the answer you want";

/// Classify trimmed chat input.
#[must_use]
pub fn parse_command(text: &str) -> ChatCommand {
    if let Some(word) = switch_target(text) {
        return ChatCommand::SwitchModel(word);
    }
    let lower = text.to_lowercase();
    if lower.contains("/clear") || lower.contains("clear conversation") {
        ChatCommand::Clear
    } else if lower.contains("/history") || lower.contains("show history") {
        ChatCommand::History
    } else if lower.contains("/help") || lower == "help" {
        ChatCommand::Help
    } else {
        ChatCommand::Forward
    }
}

/// The word after a leading switch verb, lowercased.
fn switch_target(text: &str) -> Option<String> {
    let text = text.trim_start();
    SWITCH_VERBS.iter().find_map(|verb| {
        let head = text.get(..verb.len())?;
        if !head.eq_ignore_ascii_case(verb) {
            return None;
        }
        let rest = &text[verb.len()..];
        let after_space = rest.trim_start();
        if after_space.len() == rest.len() {
            return None;
        }
        let word: String = after_space
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        (!word.is_empty()).then(|| word.to_ascii_lowercase())
    })
}

/// First candidate, in list order, that contains the query or is contained
/// in it, ignoring case.
#[must_use]
pub fn resolve_model<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Option<&'a str> {
    let query = query.to_lowercase();
    candidates.iter().map(AsRef::as_ref).find(|candidate| {
        let candidate = candidate.to_lowercase();
        candidate.contains(&query) || query.contains(&candidate)
    })
}

#[must_use]
pub fn switched_message(model: &str) -> String {
    format!("✅ Switched to {model}")
}

#[must_use]
pub fn model_not_found_message<S: AsRef<str>>(query: &str, candidates: &[S]) -> String {
    let available: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
    format!(
        "❌ Model \"{query}\" not found. Available models: {}",
        available.join(", ")
    )
}

#[must_use]
pub fn cleared_message(model: &str) -> String {
    format!("🗑️ Conversation history cleared for {model}")
}

#[must_use]
pub fn clear_failed_message(error: &str) -> String {
    format!("❌ Failed to clear conversation: {error}")
}

/// One exchange is a user turn plus an assistant turn; odd lengths show a
/// half exchange.
#[must_use]
pub fn history_message(entries: usize) -> String {
    let exchanges = entries as f64 / 2.0;
    format!("📚 Conversation has {exchanges} exchanges")
}

#[must_use]
pub fn history_failed_message(error: &str) -> String {
    format!("❌ Failed to get history: {error}")
}

#[must_use]
pub fn generation_error_message(error: &str) -> String {
    format!("❌ Error: {error}")
}

/// Actionable follow-up for recognized generation errors.
#[must_use]
pub fn generation_error_hint(error: &str) -> Option<&'static str> {
    if error.contains("not running") {
        Some("💡 Try: Run \"ollama serve\" in your terminal to start the Ollama server.")
    } else if error.contains("timed out") {
        Some("💡 Try: Use a smaller model or ask a simpler question.")
    } else {
        None
    }
}

#[must_use]
pub fn unexpected_error_message(error: &str) -> String {
    format!("❌ Unexpected error: {error}")
}
