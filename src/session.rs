//! Process-wide session state.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub current_model: Option<String>,
    pub request_in_flight: bool,
    pub active_drive: Option<String>,
}

impl SessionState {
    /// Claim the chat request slot. Returns `false` if a request is already
    /// in flight.
    pub fn begin_request(&mut self) -> bool {
        if self.request_in_flight {
            return false;
        }
        self.request_in_flight = true;
        true
    }

    pub fn end_request(&mut self) {
        self.request_in_flight = false;
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.current_model = Some(model.into());
    }

    pub fn set_active_drive(&mut self, drive: impl Into<String>) {
        self.active_drive = Some(drive.into());
    }
}
