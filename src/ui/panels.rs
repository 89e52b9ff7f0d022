//! Model selector, storage banner and home statistics.

use serde::Serialize;

use crate::drives::ActiveConfiguration;
use crate::host::api::DownloadedModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

/// The chat model dropdown.
///
/// `placeholder` is a disabled empty-valued entry shown before the options;
/// it never takes part in model matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelSelector {
    pub placeholder: Option<String>,
    pub options: Vec<SelectorOption>,
    pub selected: Option<String>,
}

impl ModelSelector {
    /// Options from the downloaded list, keeping `previous` when it is
    /// still offered.
    #[must_use]
    pub fn from_downloaded(models: &[DownloadedModel], previous: Option<&str>) -> Self {
        if models.is_empty() {
            return Self::placeholder_only("No models on external drive - download some first");
        }
        let options: Vec<SelectorOption> = models
            .iter()
            .map(|m| SelectorOption {
                value: m.name.clone(),
                label: format!("{} ({})", m.name, m.size.as_deref().unwrap_or("unknown")),
            })
            .collect();
        let selected = previous
            .filter(|prev| options.iter().any(|o| o.value == *prev))
            .map(str::to_owned);
        Self {
            placeholder: Some("Select a model...".to_owned()),
            options,
            selected,
        }
    }

    /// Options from the runtime's model names; the first is selected.
    #[must_use]
    pub fn from_names(names: &[String]) -> Self {
        if names.is_empty() {
            return Self::placeholder_only("No models available");
        }
        Self {
            placeholder: None,
            options: names
                .iter()
                .map(|name| SelectorOption {
                    value: name.clone(),
                    label: name.clone(),
                })
                .collect(),
            selected: names.first().cloned(),
        }
    }

    #[must_use]
    pub fn external_drive_required() -> Self {
        Self::placeholder_only("🚫 External drive required - Go to Settings")
    }

    #[must_use]
    pub fn load_error() -> Self {
        Self::placeholder_only("Error loading models")
    }

    fn placeholder_only(text: &str) -> Self {
        Self {
            placeholder: Some(text.to_owned()),
            options: Vec::new(),
            selected: None,
        }
    }

    /// Option values, in order.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        self.options.iter().map(|o| o.value.clone()).collect()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Select `value`, appending a bare option for it when missing.
    pub fn select_or_insert(&mut self, value: &str) {
        if !self.contains(value) {
            self.options.push(SelectorOption {
                value: value.to_owned(),
                label: value.to_owned(),
            });
        }
        self.selected = Some(value.to_owned());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageKind {
    External,
    /// No external drive configured.
    Lightweight,
}

/// Storage status banner in the model browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageBanner {
    pub kind: StorageKind,
    pub path: String,
    pub note: &'static str,
}

impl StorageBanner {
    /// `None` means the backend answered with a domain failure.
    #[must_use]
    pub fn from_configuration(config: Option<&ActiveConfiguration>) -> Self {
        match config {
            Some(c) if c.is_external => Self {
                kind: StorageKind::External,
                path: c.path.clone(),
                note: "All model downloads automatically go to your external drive. Your computer stays lightweight!",
            },
            _ => Self {
                kind: StorageKind::Lightweight,
                path: "External drive required".to_owned(),
                note: "This app requires external storage to prevent local storage bloat. Please select an external drive for model storage.",
            },
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.kind {
            StorageKind::External => "✅ External Drive",
            StorageKind::Lightweight => "⚠️ Lightweight App",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StorageLocation {
    External,
    Local,
    #[default]
    NotSet,
}

impl StorageLocation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::External => "External",
            Self::Local => "Local",
            Self::NotSet => "Not Set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeStats {
    pub downloaded_count: usize,
    pub storage: StorageLocation,
    pub active_model: String,
}

impl Default for HomeStats {
    fn default() -> Self {
        Self {
            downloaded_count: 0,
            storage: StorageLocation::NotSet,
            active_model: "None".to_owned(),
        }
    }
}

impl HomeStats {
    /// Active model label: the selection, else the first downloaded model,
    /// else `None`.
    #[must_use]
    pub fn active_model_label(selected: Option<&str>, downloaded: &[String]) -> String {
        selected
            .filter(|s| !s.is_empty())
            .or_else(|| downloaded.first().map(String::as_str))
            .unwrap_or("None")
            .to_owned()
    }

    #[must_use]
    pub fn storage_from(config: Option<&ActiveConfiguration>) -> StorageLocation {
        match config {
            Some(c) if c.is_external => StorageLocation::External,
            Some(_) => StorageLocation::Local,
            None => StorageLocation::NotSet,
        }
    }
}
