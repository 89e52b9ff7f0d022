use ollama_desk::host::contract::CommandName;
use ollama_desk::ui::panels::StorageLocation;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{desk, desk_with, downloaded, offline_config};

async fn tags_server(names: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    let models: Vec<serde_json::Value> = names.iter().map(|n| json!({"name": n})).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": models})))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn rejected_listing_falls_back_to_runtime_tags() {
    let server = tags_server(&["mistral:7b", "gemma:2b"]).await;
    let mut config = offline_config();
    config.runtime.api_url = server.uri();
    let desk = desk_with(config);
    desk.backend
        .always(CommandName::GetDownloadedModels, Err(json!("backend crashed")));

    desk.controller.update_home_stats().await;

    desk.controller.read(|s| {
        assert_eq!(
            s.tracker.downloaded().to_vec(),
            vec!["mistral:7b", "gemma:2b"]
        );
        assert_eq!(s.home.downloaded_count, 2);
        assert_eq!(s.home.active_model, "mistral:7b");
        assert_eq!(s.home.storage, StorageLocation::Local);
    });
}

#[tokio::test]
async fn refused_listing_also_falls_back() {
    let server = tags_server(&["phi3:mini"]).await;
    let mut config = offline_config();
    config.runtime.api_url = server.uri();
    let desk = desk_with(config);
    desk.backend.always(
        CommandName::GetDownloadedModels,
        Ok(json!({"success": false, "error": "not ready"})),
    );

    desk.controller.refresh_downloaded_state().await;

    assert_eq!(
        desk.controller.read(|s| s.tracker.downloaded().to_vec()),
        vec!["phi3:mini"]
    );
}

#[tokio::test]
async fn unreachable_runtime_keeps_previous_set() {
    let desk = desk();
    desk.backend
        .queue(CommandName::GetDownloadedModels, downloaded(&["llama2:7b"]));
    desk.controller.refresh_downloaded_state().await;

    desk.backend
        .always(CommandName::GetDownloadedModels, Err(json!("backend crashed")));
    desk.controller.update_home_stats().await;

    desk.controller.read(|s| {
        assert_eq!(s.tracker.downloaded().to_vec(), vec!["llama2:7b"]);
        assert_eq!(s.home.downloaded_count, 1);
    });
}
