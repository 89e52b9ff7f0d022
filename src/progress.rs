//! Download progress events and the per-card progress slots they drive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ModelCard;
use crate::downloads::DownloadTracker;

/// Download phase reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Preparing,
    Downloading,
    Verifying,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

/// Payload of a `download-progress` push event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadProgressEvent {
    #[serde(alias = "modelName", alias = "model_name")]
    pub model: String,
    pub status: ProgressStatus,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Element id of a card's progress slot: `progress-` + the key with its
/// first `:` replaced by `-`.
#[must_use]
pub fn progress_element_id(model: &str) -> String {
    format!("progress-{}", model.replacen(':', "-", 1))
}

/// Bar fill for an event. An explicit percentage wins; otherwise each phase
/// has a placeholder, and phases without one keep `previous`.
#[must_use]
pub fn fill_for(event: &DownloadProgressEvent, previous: f64) -> f64 {
    if event.status == ProgressStatus::Completed {
        return 100.0;
    }
    if let Some(p) = event.percentage {
        return p.clamp(0.0, 100.0);
    }
    match event.status {
        ProgressStatus::Preparing => 15.0,
        ProgressStatus::Downloading => 50.0,
        ProgressStatus::Verifying => 90.0,
        _ => previous,
    }
}

/// Status line for an event.
#[must_use]
pub fn text_for(event: &DownloadProgressEvent) -> String {
    match (event.status, event.percentage) {
        (ProgressStatus::Downloading, Some(p)) => {
            let mut text = format!("Downloading {p}%");
            if let Some(speed) = event.speed.as_deref().filter(|s| !s.is_empty()) {
                text.push_str(&format!(" at {speed}"));
            }
            if let Some(size) = event.size.as_deref().filter(|s| !s.is_empty()) {
                text.push_str(&format!(" ({size})"));
            }
            text
        }
        (ProgressStatus::Preparing, _) => "Preparing download...".to_owned(),
        (ProgressStatus::Verifying, _) => "Verifying download...".to_owned(),
        (ProgressStatus::Completed, _) => "Download completed! ✅".to_owned(),
        _ => event
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Processing...".to_owned()),
    }
}

/// Render state of one card's progress element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSlot {
    pub visible: bool,
    pub status: Option<ProgressStatus>,
    pub fill: f64,
    pub text: String,
}

impl Default for ProgressSlot {
    fn default() -> Self {
        Self {
            visible: false,
            status: None,
            fill: 0.0,
            text: "Preparing download...".to_owned(),
        }
    }
}

/// Progress slots of the rendered catalog, keyed by element id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressBoard {
    slots: BTreeMap<String, ProgressSlot>,
}

impl ProgressBoard {
    /// Rebuild slots for a fresh card render. Slots of keys still in flight
    /// survive; every other slot starts hidden.
    pub fn rebuild(&mut self, cards: &[ModelCard], tracker: &DownloadTracker) {
        let mut slots = BTreeMap::new();
        for card in cards {
            let slot = if tracker.is_downloading(&card.key) {
                self.slots.remove(&card.progress_id).unwrap_or_default()
            } else {
                ProgressSlot::default()
            };
            slots.insert(card.progress_id.clone(), slot);
        }
        self.slots = slots;
    }

    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&ProgressSlot> {
        self.slots.get(id)
    }

    /// Show the slot for a download that was just requested.
    pub fn show_starting(&mut self, id: &str) -> bool {
        match self.slots.get_mut(id) {
            Some(slot) => {
                slot.visible = true;
                slot.status = Some(ProgressStatus::Preparing);
                slot.text = "Starting download...".to_owned();
                true
            }
            None => false,
        }
    }

    /// Apply a push event. Returns the element id it landed in, or `None`
    /// when no such element is rendered.
    pub fn apply(&mut self, event: &DownloadProgressEvent) -> Option<String> {
        let id = progress_element_id(&event.model);
        let slot = self.slots.get_mut(&id)?;
        slot.visible = true;
        slot.status = Some(event.status);
        slot.fill = fill_for(event, slot.fill);
        slot.text = text_for(event);
        Some(id)
    }

    pub fn hide(&mut self, id: &str) -> bool {
        match self.slots.get_mut(id) {
            Some(slot) => {
                slot.visible = false;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
