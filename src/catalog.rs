//! Built-in model catalog and per-variant card state.

use serde::Serialize;

use crate::downloads::DownloadTracker;
use crate::progress::progress_element_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    pub tag: &'static str,
    pub size: &'static str,
    pub download_time: &'static str,
}

/// One downloadable model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub base_name: &'static str,
    pub variants: &'static [VariantInfo],
    pub description: &'static str,
    pub tags: &'static [&'static str],
}

const fn variant(
    tag: &'static str,
    size: &'static str,
    download_time: &'static str,
) -> VariantInfo {
    VariantInfo {
        tag,
        size,
        download_time,
    }
}

static CATALOG: [ModelDescriptor; 6] = [
    ModelDescriptor {
        base_name: "llama2",
        variants: &[
            variant("7b", "3.8GB", "5-10 min"),
            variant("13b", "7.3GB", "10-15 min"),
            variant("70b", "39GB", "45-60 min"),
        ],
        description: "Meta's Llama 2 model, excellent for general conversation and reasoning",
        tags: &["general", "reasoning"],
    },
    ModelDescriptor {
        base_name: "mistral",
        variants: &[variant("7b", "4.1GB", "6-12 min")],
        description: "Fast and capable model, great balance of performance and speed",
        tags: &["general", "fast"],
    },
    ModelDescriptor {
        base_name: "codellama",
        variants: &[
            variant("7b", "3.8GB", "5-10 min"),
            variant("13b", "7.3GB", "10-15 min"),
            variant("34b", "19GB", "25-35 min"),
        ],
        description: "Code generation and programming assistance model",
        tags: &["coding", "programming"],
    },
    ModelDescriptor {
        base_name: "phi3",
        variants: &[
            variant("mini", "2.3GB", "3-6 min"),
            variant("small", "7.9GB", "10-15 min"),
            variant("medium", "14GB", "18-25 min"),
        ],
        description: "Microsoft's efficient small language model, very fast",
        tags: &["fast", "efficient"],
    },
    ModelDescriptor {
        base_name: "gemma",
        variants: &[
            variant("2b", "1.4GB", "2-4 min"),
            variant("7b", "5.0GB", "7-12 min"),
        ],
        description: "Google's Gemma model family, lightweight and powerful",
        tags: &["general", "efficient"],
    },
    ModelDescriptor {
        base_name: "neural-chat",
        variants: &[variant("7b", "4.1GB", "6-12 min")],
        description: "Fine-tuned for helpful, harmless, and honest conversations",
        tags: &["chat", "helpful"],
    },
];

/// The embedded catalog, in display order.
#[must_use]
pub fn list_catalog() -> &'static [ModelDescriptor] {
    &CATALOG
}

/// Look up a catalog variant by base name and tag.
#[must_use]
pub fn find_variant(base_name: &str, tag: &str) -> Option<(&'static ModelDescriptor, &'static VariantInfo)> {
    CATALOG
        .iter()
        .find(|m| m.base_name == base_name)
        .and_then(|m| m.variants.iter().find(|v| v.tag == tag).map(|v| (m, v)))
}

/// Full model name (`base:variant`).
#[must_use]
pub fn card_key(base_name: &str, variant: &str) -> String {
    format!("{base_name}:{variant}")
}

/// Card button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardButton {
    Download,
    Downloading,
    Downloaded,
    Failed,
}

impl CardButton {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Download => "Download Model",
            Self::Downloading => "Downloading...",
            Self::Downloaded => "Downloaded ✓",
            Self::Failed => "Download Failed",
        }
    }

    /// Only the idle button accepts clicks.
    #[must_use]
    pub fn disabled(self) -> bool {
        !matches!(self, Self::Download)
    }
}

/// Button state for `key`. Downloaded wins over failure, failure over in flight.
#[must_use]
pub fn card_button(key: &str, tracker: &DownloadTracker) -> CardButton {
    if tracker.is_downloaded(key) {
        CardButton::Downloaded
    } else if tracker.is_failed(key) {
        CardButton::Failed
    } else if tracker.is_downloading(key) {
        CardButton::Downloading
    } else {
        CardButton::Download
    }
}

/// Render state for one (model, variant) card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCard {
    pub key: String,
    pub base_name: &'static str,
    pub variant: &'static str,
    pub size: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    /// Estimated download time, or `Ready to use` once downloaded.
    pub time_label: &'static str,
    pub downloaded: bool,
    pub button: CardButton,
    pub progress_id: String,
}

impl ModelCard {
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.button.disabled()
    }
}

/// One card per (model, variant), in catalog order.
#[must_use]
pub fn build_cards(tracker: &DownloadTracker) -> Vec<ModelCard> {
    CATALOG
        .iter()
        .flat_map(|model| {
            model.variants.iter().map(move |v| {
                let key = card_key(model.base_name, v.tag);
                let downloaded = tracker.is_downloaded(&key);
                ModelCard {
                    progress_id: progress_element_id(&key),
                    button: card_button(&key, tracker),
                    time_label: if downloaded { "Ready to use" } else { v.download_time },
                    downloaded,
                    key,
                    base_name: model.base_name,
                    variant: v.tag,
                    size: v.size,
                    description: model.description,
                    tags: model.tags,
                }
            })
        })
        .collect()
}
