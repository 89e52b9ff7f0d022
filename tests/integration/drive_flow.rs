use std::time::Duration;

use ollama_desk::drives::{self, DriveButton};
use ollama_desk::host::contract::CommandName;
use ollama_desk::ui::panels::StorageKind;
use ollama_desk::ui::views::ViewName;
use serde_json::json;

use crate::helpers::{Desk, desk};

const BUSY: &str = "Volume could not be unmounted because it is in use";

async fn with_drives() -> Desk {
    let desk = desk();
    desk.backend.always(
        CommandName::DetectExternalDrives,
        Ok(json!({"success": true, "drives": [
            {"name": "USB", "path": "/Volumes/USB"},
            {"name": "Backup", "path": "/Volumes/Backup"}
        ]})),
    );
    desk.controller.refresh_drives().await;
    desk
}

fn button(desk: &Desk, name: &str) -> DriveButton {
    desk.controller.read(|s| {
        s.drives
            .rows()
            .iter()
            .find(|row| row.drive.name == name)
            .map(|row| row.button)
            .expect("drive row")
    })
}

#[tokio::test]
async fn busy_eject_escalates_to_one_forced_retry() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::EjectDrive,
        Ok(json!({"success": false, "error": BUSY})),
    );
    let scans = desk.backend.count(CommandName::DetectExternalDrives);

    desk.controller.eject_drive("USB", false).await;

    assert_eq!(
        desk.backend.calls_to(CommandName::EjectDrive),
        vec![
            vec![json!("USB"), json!(false)],
            vec![json!("USB"), json!(true)],
        ]
    );
    assert_eq!(
        desk.prompter.confirms(),
        vec![drives::force_eject_prompt(BUSY, true)]
    );
    assert_eq!(desk.prompter.alerts(), vec![drives::ejected_message("USB")]);
    assert_eq!(
        desk.backend.count(CommandName::DetectExternalDrives),
        scans + 1
    );
}

#[tokio::test]
async fn declined_escalation_stops_after_one_call() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::EjectDrive,
        Ok(json!({"success": false, "error": BUSY})),
    );
    desk.prompter.answer(false);

    desk.controller.eject_drive("USB", false).await;

    assert_eq!(desk.backend.count(CommandName::EjectDrive), 1);
    assert_eq!(desk.prompter.confirms().len(), 1);
    assert!(desk.prompter.alerts().is_empty());
}

#[tokio::test]
async fn failed_forced_eject_is_reported() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::EjectDrive,
        Ok(json!({"success": false, "error": BUSY})),
    );

    desk.controller.eject_drive("USB", true).await;

    assert_eq!(
        desk.backend.calls_to(CommandName::EjectDrive),
        vec![vec![json!("USB"), json!(true)]]
    );
    assert!(desk.prompter.confirms().is_empty());
    assert_eq!(
        desk.prompter.alerts(),
        vec![drives::eject_failed_message(BUSY, true)]
    );
}

#[tokio::test]
async fn rejected_busy_eject_asks_with_plain_prompt() {
    let desk = with_drives().await;
    desk.backend
        .queue(CommandName::EjectDrive, Err(json!({"error": BUSY})));
    desk.prompter.answer(false);

    desk.controller.eject_drive("Backup", false).await;

    assert_eq!(
        desk.prompter.confirms(),
        vec![drives::force_eject_prompt(BUSY, false)]
    );
    assert_eq!(desk.backend.count(CommandName::EjectDrive), 1);
}

#[tokio::test]
async fn other_eject_failures_do_not_escalate() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::EjectDrive,
        Ok(json!({"success": false, "error": "drive not found"})),
    );

    desk.controller.eject_drive("USB", false).await;

    assert_eq!(desk.backend.count(CommandName::EjectDrive), 1);
    assert!(desk.prompter.confirms().is_empty());
    assert_eq!(
        desk.prompter.alerts(),
        vec![drives::eject_failed_message("drive not found", false)]
    );
}

#[tokio::test]
async fn activating_a_drive_marks_it_in_use() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::UseForModels,
        Ok(json!({"success": true, "modelsPath": "/Volumes/USB/ollama-models"})),
    );
    desk.backend.always(
        CommandName::GetModelsLocation,
        Ok(json!({"success": true, "isExternal": true, "path": "/Volumes/USB/ollama-models"})),
    );

    assert!(desk.controller.activate_drive("USB", "/Volumes/USB").await);

    assert_eq!(
        desk.backend.calls_to(CommandName::UseForModels),
        vec![vec![json!("USB"), json!("/Volumes/USB")]]
    );
    assert_eq!(
        desk.prompter.confirms(),
        vec![drives::activation_prompt("USB", "/Volumes/USB")]
    );
    assert_eq!(
        desk.prompter.alerts(),
        vec![drives::activation_success("USB", "/Volumes/USB/ollama-models")]
    );
    assert_eq!(button(&desk, "USB"), DriveButton::CurrentlyUsed);
    assert_eq!(button(&desk, "Backup"), DriveButton::UseForModels);
    desk.controller.read(|s| {
        assert_eq!(s.session.active_drive.as_deref(), Some("USB"));
        let banner = s.storage.as_ref().expect("storage banner");
        assert_eq!(banner.kind, StorageKind::External);
        assert_eq!(banner.path, "/Volumes/USB/ollama-models");
    });

    desk.controller.refresh_drives().await;
    assert_eq!(button(&desk, "USB"), DriveButton::CurrentlyUsed);
}

#[tokio::test]
async fn declined_activation_calls_nothing() {
    let desk = with_drives().await;
    desk.prompter.answer(false);

    assert!(!desk.controller.activate_drive("USB", "/Volumes/USB").await);

    assert_eq!(desk.backend.count(CommandName::UseForModels), 0);
    assert_eq!(button(&desk, "USB"), DriveButton::UseForModels);
}

#[tokio::test]
async fn failed_activation_restores_button() {
    let desk = with_drives().await;
    desk.backend.queue(
        CommandName::UseForModels,
        Ok(json!({"success": false, "error": "drive is read-only"})),
    );

    assert!(!desk.controller.activate_drive("USB", "/Volumes/USB").await);

    assert_eq!(
        desk.prompter.alerts(),
        vec![drives::activation_failure("drive is read-only")]
    );
    assert_eq!(button(&desk, "USB"), DriveButton::UseForModels);
    assert!(desk.controller.read(|s| s.session.active_drive.is_none()));
}

#[tokio::test]
async fn existing_external_config_is_adopted() {
    let desk = desk();
    desk.backend.always(
        CommandName::GetModelsLocation,
        Ok(json!({"success": true, "isExternal": true, "path": "/Volumes/T7/ollama-models"})),
    );

    desk.controller.check_existing_drive_config().await;

    desk.controller.read(|s| {
        assert_eq!(s.session.active_drive.as_deref(), Some("T7"));
        assert_eq!(
            s.storage.as_ref().map(|b| b.kind),
            Some(StorageKind::External)
        );
    });
}

#[tokio::test]
async fn empty_scan_shows_placeholder() {
    let desk = desk();

    desk.controller.refresh_drives().await;

    assert_eq!(
        desk.controller
            .read(|s| s.drives.placeholder().map(str::to_owned))
            .as_deref(),
        Some("No external drives found")
    );
}

#[tokio::test(start_paused = true)]
async fn drive_poll_runs_only_while_settings_is_open() {
    let desk = desk();

    assert!(desk.controller.switch_view("settings").await);
    assert!(desk.controller.is_drive_polling());
    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), 1);

    tokio::time::sleep(Duration::from_millis(6_500)).await;
    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), 3);

    assert!(desk.controller.switch_view("home").await);
    assert!(!desk.controller.is_drive_polling());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), 3);
}

#[tokio::test(start_paused = true)]
async fn leaving_settings_during_location_lookup_starts_no_drive_poll() {
    let desk = desk();
    desk.delay(CommandName::GetModelsLocation, Duration::from_secs(1));

    let controller = desk.controller.clone();
    let entering = tokio::spawn(async move { controller.switch_view("settings").await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(desk.controller.switch_view("chat").await);
    assert!(entering.await.expect("settings task"));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(desk.controller.read(|s| s.router.is_active(ViewName::Chat)));
    assert!(!desk.controller.is_drive_polling());
    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), 0);
}

#[tokio::test(start_paused = true)]
async fn drive_poll_outside_settings_stops_itself() {
    let desk = desk();
    desk.controller.start_drive_poll();
    assert!(desk.controller.is_drive_polling());

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert!(!desk.controller.is_drive_polling());
    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), 0);
}

#[tokio::test(start_paused = true)]
async fn rescans_keep_pending_activation_disabled() {
    let desk = with_drives().await;
    assert!(desk.controller.switch_view("settings").await);
    desk.delay(CommandName::UseForModels, Duration::from_secs(10));
    desk.backend.queue(
        CommandName::UseForModels,
        Ok(json!({"success": true, "modelsPath": "/Volumes/USB/ollama-models"})),
    );
    let scans = desk.backend.count(CommandName::DetectExternalDrives);

    let controller = desk.controller.clone();
    let activation =
        tokio::spawn(async move { controller.activate_drive("USB", "/Volumes/USB").await });
    tokio::time::sleep(Duration::from_millis(6_500)).await;

    assert_eq!(desk.backend.count(CommandName::DetectExternalDrives), scans + 2);
    assert_eq!(button(&desk, "USB"), DriveButton::SettingUp);
    assert_eq!(button(&desk, "Backup"), DriveButton::UseForModels);

    assert!(!desk.controller.activate_drive("Backup", "/Volumes/Backup").await);
    assert_eq!(
        desk.prompter.confirms(),
        vec![drives::activation_prompt("USB", "/Volumes/USB")]
    );

    assert!(activation.await.expect("activation task"));
    assert_eq!(desk.backend.count(CommandName::UseForModels), 1);
    assert_eq!(button(&desk, "USB"), DriveButton::CurrentlyUsed);
    assert_eq!(button(&desk, "Backup"), DriveButton::UseForModels);
}
