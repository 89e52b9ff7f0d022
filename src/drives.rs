//! External drive list and storage configuration state.

use serde::{Deserialize, Serialize};

/// An external volume reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveDescriptor {
    pub name: String,
    pub path: String,
}

/// Where the backend stores models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveConfiguration {
    #[serde(rename = "isExternal")]
    pub is_external: bool,
    pub path: String,
}

/// Error text the backend uses when a volume is busy.
const BUSY_MARKER: &str = "could not be unmounted";

/// A normal eject failed because something holds the volume open.
#[must_use]
pub fn is_busy_error(error: &str) -> bool {
    error.contains(BUSY_MARKER)
}

/// Volume name from a `/Volumes/<name>/...` path.
#[must_use]
pub fn drive_name_from_models_path(path: &str) -> Option<&str> {
    let mut parts = path.split('/');
    parts.by_ref().find(|part| *part == "Volumes")?;
    parts.next().filter(|name| !name.is_empty())
}

/// Confirmation shown before moving model storage to a drive.
#[must_use]
pub fn activation_prompt(name: &str, path: &str) -> String {
    format!(
        "Use external drive \"{name}\" for all model storage?

📍 Drive Location: {path}
📁 Models Folder: {path}/ollama-models/

ℹ️  What will happen:
• All new model downloads will go to external drive
• Your existing local models will be moved to external drive
• Local computer storage will stay lightweight
• You'll need to manually restart Ollama after this change

⚠️  Note: This app requires external storage to prevent local storage bloat.

Do you want to continue?"
    )
}

#[must_use]
pub fn activation_success(name: &str, models_path: &str) -> String {
    format!(
        "✅ Success! External drive \"{name}\" is now permanently configured for all model downloads.

📁 All future models will automatically download to:
{models_path}

🎯 Setup complete! No manual configuration needed.
All downloads will now go to your external drive automatically."
    )
}

#[must_use]
pub fn activation_failure(error: &str) -> String {
    format!("❌ Failed to setup external drive: {error}")
}

#[must_use]
pub fn activation_error(error: &str) -> String {
    format!("❌ Error: {error}")
}

#[must_use]
pub fn ejected_message(name: &str) -> String {
    format!("Drive \"{name}\" ejected successfully")
}

/// Offer to force-eject after a busy failure. `delivered` is false when the
/// call itself was rejected.
#[must_use]
pub fn force_eject_prompt(error: &str, delivered: bool) -> String {
    if delivered {
        format!(
            "Normal eject failed because something is using the drive. Try force eject?\n\nError: {error}"
        )
    } else {
        format!("Normal eject failed. Try force eject?\n\nError: {error}")
    }
}

#[must_use]
pub fn eject_failed_message(error: &str, force: bool) -> String {
    let kind = if force { "force eject" } else { "eject" };
    format!("Failed to {kind} drive: {error}")
}

/// Use-drive button of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveButton {
    UseForModels,
    SettingUp,
    CurrentlyUsed,
}

impl DriveButton {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UseForModels => "Use for Models",
            Self::SettingUp => "Setting up...",
            Self::CurrentlyUsed => "Currently Used ✓",
        }
    }

    #[must_use]
    pub fn disabled(self) -> bool {
        !matches!(self, Self::UseForModels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveRow {
    pub drive: DriveDescriptor,
    pub button: DriveButton,
}

/// Body of the drive panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum DriveListing {
    /// Nothing rendered yet.
    #[default]
    Empty,
    Placeholder(String),
    Rows(Vec<DriveRow>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrivePanel {
    pub listing: DriveListing,
    /// Drive whose `use-for-models` call is in flight.
    activating: Option<String>,
}

fn button_for(activating: Option<&str>, name: &str, active_drive: Option<&str>) -> DriveButton {
    if activating == Some(name) {
        DriveButton::SettingUp
    } else if active_drive == Some(name) {
        DriveButton::CurrentlyUsed
    } else {
        DriveButton::UseForModels
    }
}

impl DrivePanel {
    /// A rescan only shows the scanning placeholder when no rows are up.
    pub fn begin_scan(&mut self) {
        if !matches!(self.listing, DriveListing::Rows(_)) {
            self.listing = DriveListing::Placeholder("Scanning for drives...".to_owned());
        }
    }

    pub fn show_drives(&mut self, drives: Vec<DriveDescriptor>, active_drive: Option<&str>) {
        if drives.is_empty() {
            self.listing = DriveListing::Placeholder("No external drives found".to_owned());
            return;
        }
        let rows = drives
            .into_iter()
            .map(|drive| DriveRow {
                button: button_for(self.activating.as_deref(), &drive.name, active_drive),
                drive,
            })
            .collect();
        self.listing = DriveListing::Rows(rows);
    }

    pub fn show_error(&mut self, error: &str) {
        self.listing = DriveListing::Placeholder(format!("Error: {error}"));
    }

    pub fn show_detect_failed(&mut self) {
        self.listing = DriveListing::Placeholder("Failed to detect drives".to_owned());
    }

    #[must_use]
    pub fn rows(&self) -> &[DriveRow] {
        match &self.listing {
            DriveListing::Rows(rows) => rows,
            _ => &[],
        }
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match &self.listing {
            DriveListing::Placeholder(text) => Some(text),
            _ => None,
        }
    }

    /// Mark `name` as being set up. Only one activation runs at a time;
    /// returns `false` while another is pending. The row keeps its
    /// `SettingUp` button across rescans until [`Self::finish_activation`].
    pub fn begin_activation(&mut self, name: &str, active_drive: Option<&str>) -> bool {
        if self.activating.is_some() {
            return false;
        }
        self.activating = Some(name.to_owned());
        self.sync_buttons(active_drive);
        true
    }

    /// End the pending activation and redraw buttons for `active_drive`.
    pub fn finish_activation(&mut self, active_drive: Option<&str>) {
        self.activating = None;
        self.sync_buttons(active_drive);
    }

    #[must_use]
    pub fn is_activating(&self) -> bool {
        self.activating.is_some()
    }

    fn sync_buttons(&mut self, active_drive: Option<&str>) {
        let activating = self.activating.as_deref();
        if let DriveListing::Rows(rows) = &mut self.listing {
            for row in rows {
                row.button = button_for(activating, &row.drive.name, active_drive);
            }
        }
    }
}
