//! Document analyzer and code assistant prompts.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalyzerAction {
    Analyze,
    Summarize,
    Extract,
}

impl AnalyzerAction {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "analyze" => Some(Self::Analyze),
            "summarize" => Some(Self::Summarize),
            "extract" => Some(Self::Extract),
            _ => None,
        }
    }

    #[must_use]
    pub fn prompt(self, text: &str) -> String {
        match self {
            Self::Summarize => {
                format!("Please provide a concise summary of the following text:\n\n{text}")
            }
            Self::Extract => format!(
                "Please extract the key points from the following text as a bulleted list:\n\n{text}"
            ),
            Self::Analyze => {
                format!("Please analyze the following text and provide insights:\n\n{text}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoderAction {
    Generate,
    Review,
    Explain,
}

impl CoderAction {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "generate" => Some(Self::Generate),
            "review" => Some(Self::Review),
            "explain" => Some(Self::Explain),
            _ => None,
        }
    }

    #[must_use]
    pub fn prompt(self, language: &str, input: &str) -> String {
        match self {
            Self::Generate => format!(
                "Generate {language} code for the following request:\n\n{input}\n\nPlease provide clean, well-commented code."
            ),
            Self::Review => format!(
                "Please review the following {language} code and suggest improvements:\n\n{input}"
            ),
            Self::Explain => format!("Please explain how this {language} code works:\n\n{input}"),
        }
    }
}

/// Which tool a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToolKind {
    Analyzer,
    Coder,
}

impl ToolKind {
    #[must_use]
    pub fn loading_text(self) -> &'static str {
        match self {
            Self::Analyzer => "🔄 Analyzing...",
            Self::Coder => "🔄 Processing...",
        }
    }

    #[must_use]
    pub fn missing_input_alert(self) -> &'static str {
        match self {
            Self::Analyzer => "Please enter some text to analyze",
            Self::Coder => "Please enter a description or code",
        }
    }

    #[must_use]
    pub fn missing_model_alert(self) -> &'static str {
        match self {
            Self::Analyzer => "Please select a model for analysis",
            Self::Coder => "Please select a model for code assistance",
        }
    }

    #[must_use]
    pub fn model_placeholder(self) -> &'static str {
        match self {
            Self::Analyzer => "Select analysis model...",
            Self::Coder => "Select coding model...",
        }
    }
}

/// Result area of a tool panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum ToolResult {
    #[default]
    Idle,
    Loading,
    /// Escaped model output.
    Output(String),
    Error(String),
}

impl ToolResult {
    #[must_use]
    pub fn output(raw: &str) -> Self {
        Self::Output(crate::format::escape_html(raw))
    }

    #[must_use]
    pub fn error(error: &str) -> Self {
        Self::Error(format!("Error: {}", crate::format::escape_html(error)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolPanel {
    /// Downloaded models offered in the panel's model select.
    pub models: Vec<String>,
    pub result: ToolResult,
}
