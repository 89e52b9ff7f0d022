//! External drive configuration.

use std::sync::PoisonError;

use tracing::{debug, info, warn};

use super::DeskController;
use crate::drives;
use crate::host::api::Outcome;
use crate::ui::UiUpdate;
use crate::ui::views::ViewName;
use crate::ui::panels::StorageBanner;

impl DeskController {
    /// Rescan external volumes.
    pub async fn refresh_drives(&self) {
        self.mutate(|s| s.drives.begin_scan());
        self.publish(UiUpdate::Drives);

        let result = self.api().detect_external_drives().await;
        self.mutate(|s| match result {
            Ok(Outcome::Success(found)) => {
                let active = s.session.active_drive.clone();
                s.drives.show_drives(found, active.as_deref());
            }
            Ok(Outcome::Failure(failure)) => s.drives.show_error(&failure.error),
            Err(e) => {
                warn!(error = %e, "drive detection failed");
                s.drives.show_detect_failed();
            }
        });
        self.publish(UiUpdate::Drives);
    }

    /// Move model storage to `name` after the user confirms. Returns whether
    /// the backend accepted the drive.
    pub async fn activate_drive(&self, name: &str, path: &str) -> bool {
        if self.read(|s| s.drives.is_activating()) {
            debug!(drive = name, "drive activation already in progress");
            return false;
        }
        if !self
            .prompter()
            .confirm(&drives::activation_prompt(name, path))
            .await
        {
            return false;
        }

        let started = self.mutate(|s| {
            s.drives
                .begin_activation(name, s.session.active_drive.as_deref())
        });
        if !started {
            debug!(drive = name, "drive activation already in progress");
            return false;
        }
        self.publish(UiUpdate::Drives);

        let finish = |controller: &DeskController| {
            controller.mutate(|s| {
                s.drives
                    .finish_activation(s.session.active_drive.as_deref())
            });
            controller.publish(UiUpdate::Drives);
        };

        match self.api().use_for_models(name, path).await {
            Ok(Outcome::Success(models_path)) => {
                info!(drive = name, models_path = %models_path, "external drive configured");
                self.prompter()
                    .alert(&drives::activation_success(name, &models_path))
                    .await;
                self.mutate(|s| s.session.set_active_drive(name));
                finish(self);
                self.update_storage_banner().await;
                true
            }
            Ok(Outcome::Failure(failure)) => {
                self.prompter()
                    .alert(&drives::activation_failure(&failure.error))
                    .await;
                finish(self);
                false
            }
            Err(e) => {
                warn!(error = %e, drive = name, "use-for-models failed");
                self.prompter()
                    .alert(&drives::activation_error(&e.user_message()))
                    .await;
                finish(self);
                false
            }
        }
    }

    /// Eject a drive. A normal eject that fails because the volume is busy
    /// offers one forced retry.
    pub async fn eject_drive(&self, name: &str, force: bool) {
        let mut force = force;
        loop {
            let (error, delivered) = match self.api().eject_drive(name, force).await {
                Ok(Outcome::Success(())) => {
                    info!(drive = name, force, "drive ejected");
                    self.prompter().alert(&drives::ejected_message(name)).await;
                    self.refresh_drives().await;
                    return;
                }
                Ok(Outcome::Failure(failure)) => (failure.error, true),
                Err(e) => {
                    warn!(error = %e, drive = name, force, "eject-drive failed");
                    (e.user_message(), false)
                }
            };

            if !force && drives::is_busy_error(&error) {
                let retry = self
                    .prompter()
                    .confirm(&drives::force_eject_prompt(&error, delivered))
                    .await;
                if retry {
                    force = true;
                    continue;
                }
                return;
            }
            self.prompter()
                .alert(&drives::eject_failed_message(&error, force))
                .await;
            return;
        }
    }

    /// Adopt the drive of an already-configured external models path.
    pub async fn check_existing_drive_config(&self) {
        match self.api().get_models_location().await {
            Ok(Outcome::Success(config)) if config.is_external => {
                let Some(drive) = drives::drive_name_from_models_path(&config.path) else {
                    return;
                };
                info!(drive, "detected active external drive");
                self.mutate(|s| s.session.set_active_drive(drive));
                self.update_storage_banner().await;
            }
            Ok(_) => debug!("no external drive configured"),
            Err(e) => debug!(error = %e, "no existing external drive configuration found"),
        }
    }

    /// Refresh the storage banner from the backend's models location.
    pub async fn update_storage_banner(&self) {
        let banner = match self.api().get_models_location().await {
            Ok(Outcome::Success(config)) => StorageBanner::from_configuration(Some(&config)),
            Ok(Outcome::Failure(_)) => StorageBanner::from_configuration(None),
            Err(e) => {
                debug!(error = %e, "could not determine storage location");
                return;
            }
        };
        self.mutate(|s| s.storage = Some(banner));
        self.publish(UiUpdate::Storage);
    }

    /// Rescan drives on the configured cadence until stopped. Replaces any
    /// running drive poll.
    pub fn start_drive_poll(&self) {
        let poller = self.spawn_poller("drive-poll", self.inner.timing.drive_poll(), |c| async move {
            if c.settings_open() {
                c.refresh_drives().await;
            } else {
                debug!("settings view closed; stopping drive poll");
                c.stop_drive_poll();
            }
        });
        *self
            .inner
            .drive_poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(poller);
    }

    pub fn stop_drive_poll(&self) {
        let poller = self
            .inner
            .drive_poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(poller) = poller {
            debug!(poller = poller.name(), "stopping drive poll");
            poller.cancel();
        }
    }

    pub(super) fn settings_open(&self) -> bool {
        self.read(|s| s.router.is_active(ViewName::Settings))
    }

    #[must_use]
    pub fn is_drive_polling(&self) -> bool {
        self.inner
            .drive_poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.is_cancelled())
    }
}
