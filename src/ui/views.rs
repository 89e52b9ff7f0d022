//! Named views and the active-view router.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewName {
    #[default]
    Home,
    Chat,
    Models,
    Settings,
    Analyzer,
    Coder,
}

impl ViewName {
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Chat,
        Self::Models,
        Self::Settings,
        Self::Analyzer,
        Self::Coder,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Chat => "chat",
            Self::Models => "models",
            Self::Settings => "settings",
            Self::Analyzer => "analyzer",
            Self::Coder => "coder",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.as_str() == name)
    }
}

impl std::fmt::Display for ViewName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one view is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewRouter {
    active: ViewName,
}

/// Result of a successful switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSwitch {
    pub from: ViewName,
    pub to: ViewName,
}

impl ViewRouter {
    #[must_use]
    pub fn active(&self) -> ViewName {
        self.active
    }

    #[must_use]
    pub fn is_active(&self, view: ViewName) -> bool {
        self.active == view
    }

    /// Activate `name`. Unknown names leave the router untouched.
    pub fn switch(&mut self, name: &str) -> Option<ViewSwitch> {
        let to = ViewName::parse(name)?;
        let from = std::mem::replace(&mut self.active, to);
        Some(ViewSwitch { from, to })
    }
}
