use std::time::Duration;

use ollama_desk::catalog::{CardButton, ModelCard};
use ollama_desk::host::contract::CommandName;
use ollama_desk::progress::ProgressStatus;
use ollama_desk::ui::{UiState, UiUpdate};
use serde_json::json;

use crate::helpers::{Desk, desk, downloaded, next_update};

fn card(state: &UiState, key: &str) -> ModelCard {
    state
        .cards
        .iter()
        .find(|card| card.key == key)
        .cloned()
        .expect("card is rendered")
}

fn assert_disabled_iff_busy(desk: &Desk) {
    desk.controller.read(|s| {
        for card in &s.cards {
            assert_eq!(
                card.button.disabled(),
                s.tracker.is_busy(&card.key),
                "{}",
                card.key
            );
        }
    });
}

async fn models_view() -> Desk {
    let desk = desk();
    assert!(desk.controller.switch_view("models").await);
    desk
}

#[tokio::test(start_paused = true)]
async fn successful_download_moves_only_its_key() {
    let desk = models_view().await;
    desk.backend
        .always(CommandName::GetDownloadedModels, downloaded(&["mistral:7b"]));

    assert!(desk.controller.download("mistral", "7b").await);

    assert_eq!(
        desk.backend.calls_to(CommandName::DownloadModel),
        vec![vec![json!("mistral"), json!("7b")]]
    );
    desk.controller.read(|s| {
        assert_eq!(s.tracker.downloaded().to_vec(), vec!["mistral:7b"]);
        assert_eq!(s.tracker.downloading().count(), 0);
        let mistral = card(s, "mistral:7b");
        assert_eq!(mistral.button, CardButton::Downloaded);
        assert_eq!(mistral.time_label, "Ready to use");
        for other in s.cards.iter().filter(|c| c.key != "mistral:7b") {
            assert_eq!(other.button, CardButton::Download, "{}", other.key);
        }
    });
    assert_disabled_iff_busy(&desk);

    let successes: Vec<String> = desk
        .system_texts()
        .into_iter()
        .filter(|t| t.starts_with("Successfully downloaded mistral:7b!"))
        .collect();
    assert_eq!(successes.len(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;

    desk.controller.read(|s| {
        assert_eq!(card(s, "mistral:7b").button, CardButton::Downloaded);
        let slot = s.progress.slot("progress-mistral-7b").expect("slot");
        assert!(!slot.visible);
    });
    assert!(!desk.controller.download("mistral", "7b").await);
    assert_eq!(desk.backend.count(CommandName::DownloadModel), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_download_stays_blocked_until_restore() {
    let desk = models_view().await;
    desk.backend.queue(
        CommandName::DownloadModel,
        Ok(json!({"success": false, "error": "disk full"})),
    );

    assert!(desk.controller.download("llama2", "7b").await);

    desk.controller.read(|s| {
        assert!(s.tracker.is_failed("llama2:7b"));
        assert_eq!(card(s, "llama2:7b").button, CardButton::Failed);
        let slot = s.progress.slot("progress-llama2-7b").expect("slot");
        assert!(slot.visible);
    });
    assert_disabled_iff_busy(&desk);
    assert_eq!(
        desk.system_texts(),
        vec!["Failed to download llama2:7b: disk full"]
    );

    assert!(!desk.controller.download("llama2", "7b").await);
    assert_eq!(desk.backend.count(CommandName::DownloadModel), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        desk.controller.read(|s| card(s, "llama2:7b").button),
        CardButton::Failed
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    desk.controller.read(|s| {
        assert!(!s.tracker.is_busy("llama2:7b"));
        assert_eq!(card(s, "llama2:7b").button, CardButton::Download);
        assert!(!s.progress.slot("progress-llama2-7b").expect("slot").visible);
    });
    assert_disabled_iff_busy(&desk);
}

#[tokio::test(start_paused = true)]
async fn rejected_download_reports_and_restores() {
    let desk = models_view().await;
    desk.backend
        .queue(CommandName::DownloadModel, Err(json!("connection reset")));

    assert!(desk.controller.download("gemma", "2b").await);

    assert_eq!(
        desk.system_texts(),
        vec!["Download error for gemma:2b: connection reset"]
    );
    assert_eq!(
        desk.controller.read(|s| card(s, "gemma:2b").button),
        CardButton::Failed
    );

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(
        desk.controller.read(|s| card(s, "gemma:2b").button),
        CardButton::Download
    );
}

#[tokio::test]
async fn download_needs_a_rendered_catalog_card() {
    let desk = desk();

    assert!(!desk.controller.download("mistral", "7b").await);
    assert!(desk.controller.switch_view("models").await);
    assert!(!desk.controller.download("mistral", "70b").await);

    assert_eq!(desk.backend.count(CommandName::DownloadModel), 0);
    assert!(desk.system_texts().is_empty());
}

#[tokio::test]
async fn catalog_marks_backend_downloads() {
    let desk = desk();
    desk.backend.always(
        CommandName::GetDownloadedModels,
        downloaded(&["phi3:mini", "llama2:13b"]),
    );

    assert!(desk.controller.switch_view("models").await);

    desk.controller.read(|s| {
        assert_eq!(s.cards.len(), 13);
        assert_eq!(card(s, "phi3:mini").button, CardButton::Downloaded);
        assert_eq!(card(s, "llama2:13b").button, CardButton::Downloaded);
        assert_eq!(card(s, "llama2:7b").button, CardButton::Download);
    });
    assert_disabled_iff_busy(&desk);
}

#[tokio::test]
async fn progress_for_unrendered_card_is_dropped() {
    let desk = models_view().await;
    desk.controller.listen_for_events();
    let mut rx = desk.controller.subscribe();

    desk.emit_progress(json!({"model": "ghost:1b", "status": "downloading", "percentage": 10}));
    desk.emit_progress(json!({
        "model": "llama2:7b",
        "status": "downloading",
        "percentage": 42.0,
        "speed": "12 MB/s"
    }));

    let update = next_update(&mut rx, |u| matches!(u, UiUpdate::Progress(_))).await;
    assert_eq!(update, UiUpdate::Progress("progress-llama2-7b".to_owned()));

    desk.controller.read(|s| {
        assert!(s.progress.slot("progress-ghost-1b").is_none());
        let slot = s.progress.slot("progress-llama2-7b").expect("slot");
        assert!(slot.visible);
        assert_eq!(slot.status, Some(ProgressStatus::Downloading));
        assert!((slot.fill - 42.0).abs() < f64::EPSILON);
        assert_eq!(slot.text, "Downloading 42% at 12 MB/s");
    });
    assert_eq!(desk.backend.count(CommandName::DownloadModel), 0);
}

#[tokio::test(start_paused = true)]
async fn completed_progress_hides_after_delay() {
    let desk = models_view().await;
    desk.controller.listen_for_events();
    let mut rx = desk.controller.subscribe();

    desk.emit_progress(json!({"modelName": "phi3:mini", "status": "completed"}));
    next_update(&mut rx, |u| matches!(u, UiUpdate::Progress(_))).await;

    desk.controller.read(|s| {
        let slot = s.progress.slot("progress-phi3-mini").expect("slot");
        assert!(slot.visible);
        assert!((slot.fill - 100.0).abs() < f64::EPSILON);
    });

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(
        !desk
            .controller
            .read(|s| s.progress.slot("progress-phi3-mini").expect("slot").visible)
    );
}

#[tokio::test(start_paused = true)]
async fn late_progress_after_download_stays_hidden() {
    let desk = models_view().await;
    desk.controller.listen_for_events();
    let mut rx = desk.controller.subscribe();
    desk.backend
        .always(CommandName::GetDownloadedModels, downloaded(&["mistral:7b"]));

    assert!(desk.controller.download("mistral", "7b").await);
    tokio::time::sleep(Duration::from_secs(4)).await;

    desk.emit_progress(json!({"model": "mistral:7b", "status": "downloading", "percentage": 50}));
    desk.emit_progress(json!({"model": "phi3:mini", "status": "downloading", "percentage": 10}));
    next_update(&mut rx, |u| {
        matches!(u, UiUpdate::Progress(id) if id == "progress-phi3-mini")
    })
    .await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    desk.controller.read(|s| {
        assert_eq!(card(s, "mistral:7b").button, CardButton::Downloaded);
        let slot = s.progress.slot("progress-mistral-7b").expect("slot");
        assert!(!slot.visible);
        assert!(s.progress.slot("progress-phi3-mini").expect("slot").visible);
    });
}
