//! View model.
//!
//! [`UiState`] is everything a front-end renders. The controller mutates it
//! and publishes a [`UiUpdate`] naming the part that changed.

pub mod panels;
pub mod prompt;
pub mod views;

use crate::catalog::ModelCard;
use crate::downloads::DownloadTracker;
use crate::drives::DrivePanel;
use crate::host::api::DownloadedModel;
use crate::progress::ProgressBoard;
use crate::session::SessionState;
use crate::status::ConnectionState;
use crate::tools::{ToolKind, ToolPanel};
use crate::transcript::{ChatMessage, Transcript};

use panels::{HomeStats, ModelSelector, StorageBanner};
use views::{ViewName, ViewRouter};

/// Typing indicator shown while a generation request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingIndicator {
    pub model: String,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub router: ViewRouter,
    pub connection: ConnectionState,
    pub session: SessionState,
    pub transcript: Transcript,
    pub typing: Option<TypingIndicator>,
    pub selector: ModelSelector,
    pub tracker: DownloadTracker,
    pub cards: Vec<ModelCard>,
    pub progress: ProgressBoard,
    /// Downloaded models with their sizes, for the manage list.
    pub downloaded_models: Vec<DownloadedModel>,
    pub drives: DrivePanel,
    pub storage: Option<StorageBanner>,
    pub home: HomeStats,
    pub analyzer: ToolPanel,
    pub coder: ToolPanel,
}

impl UiState {
    #[must_use]
    pub fn tool(&self, kind: ToolKind) -> &ToolPanel {
        match kind {
            ToolKind::Analyzer => &self.analyzer,
            ToolKind::Coder => &self.coder,
        }
    }

    pub fn tool_mut(&mut self, kind: ToolKind) -> &mut ToolPanel {
        match kind {
            ToolKind::Analyzer => &mut self.analyzer,
            ToolKind::Coder => &mut self.coder,
        }
    }

    /// The model selected in the chat dropdown.
    #[must_use]
    pub fn selected_model(&self) -> Option<&str> {
        self.session.current_model.as_deref()
    }

    /// Set the dropdown and session selection together.
    pub fn set_selector(&mut self, selector: ModelSelector) {
        self.session.current_model = selector.selected.clone();
        self.selector = selector;
    }
}

/// Which part of [`UiState`] changed.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    View(ViewName),
    Connection(ConnectionState),
    MessageAppended(ChatMessage),
    Typing(bool),
    Selector,
    Cards,
    /// A progress slot changed; carries its element id.
    Progress(String),
    DownloadedModels,
    Drives,
    Storage,
    Home,
    Tool(ToolKind),
    /// Transient confirmation toast.
    Notice(String),
}
