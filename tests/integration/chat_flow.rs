use ollama_desk::commands;
use ollama_desk::host::contract::CommandName;
use ollama_desk::transcript::Sender;
use ollama_desk::ui::UiUpdate;
use serde_json::json;

use crate::helpers::{Desk, desk, downloaded};

/// Chat view open with `names` downloaded and the first one selected.
async fn chat_ready(names: &[&str]) -> Desk {
    let desk = desk();
    desk.backend
        .always(CommandName::GetDownloadedModels, downloaded(names));
    assert!(desk.controller.switch_view("chat").await);
    assert!(desk.controller.select_model(names[0]).await);
    desk
}

#[tokio::test]
async fn send_without_model_asks_for_one() {
    let desk = desk();

    desk.controller.send_message("hello there").await;

    assert_eq!(desk.system_texts(), vec![commands::SELECT_MODEL_FIRST]);
    assert!(desk.texts_from(Sender::User).is_empty());
    assert_eq!(desk.backend.count(CommandName::ChatMessage), 0);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let desk = chat_ready(&["llama2:7b"]).await;
    let before = desk.controller.read(|s| s.transcript.len());

    desk.controller.send_message("   \n ").await;

    assert_eq!(desk.controller.read(|s| s.transcript.len()), before);
    assert_eq!(desk.backend.count(CommandName::ChatMessage), 0);
}

#[tokio::test]
async fn reply_markup_stays_escaped() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Ok(json!({"success": true, "message": "<script>alert(1)</script>", "tokens": 7})),
    );

    desk.controller.send_message("hi").await;

    assert_eq!(
        desk.backend.calls_to(CommandName::ChatMessage),
        vec![vec![json!("hi"), json!("llama2:7b")]]
    );
    let reply = desk
        .controller
        .read(|s| s.transcript.last().cloned())
        .expect("assistant reply");
    assert_eq!(reply.sender, Sender::Assistant);
    assert!(reply.markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!reply.markup.contains("<script>"));

    let meta = reply.metadata.expect("reply metadata");
    assert_eq!(meta.model_name, "llama2:7b");
    assert_eq!(meta.token_count, Some(7));
}

#[tokio::test]
async fn inline_code_in_reply_is_marked_up() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Ok(json!({"success": true, "message": "Run `print(1)` now"})),
    );

    desk.controller.send_message("how do I print?").await;

    let markup = desk
        .controller
        .read(|s| s.transcript.last().map(|m| m.markup.clone()))
        .expect("assistant reply");
    assert!(
        markup.contains(r#"<code class="inline-code">print(1)</code>"#),
        "{markup}"
    );
}

#[tokio::test]
async fn typing_indicator_wraps_generation() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Ok(json!({"success": true, "message": "hello"})),
    );
    let mut rx = desk.controller.subscribe();

    desk.controller.send_message("hi").await;

    let mut typing = Vec::new();
    while let Ok(update) = rx.try_recv() {
        if let UiUpdate::Typing(on) = update {
            typing.push(on);
        }
    }
    assert_eq!(typing, vec![true, false]);
    assert!(desk.controller.read(|s| s.typing.is_none()));
    assert!(!desk.controller.read(|s| s.session.request_in_flight));
}

#[tokio::test]
async fn switch_phrase_selects_matching_model() {
    let desk = chat_ready(&["llama2:7b", "mistral:7b"]).await;

    desk.controller.send_message("use mistral").await;

    assert_eq!(
        desk.controller.read(|s| s.selector.selected.clone()).as_deref(),
        Some("mistral:7b")
    );
    assert_eq!(
        desk.controller
            .read(|s| s.session.current_model.clone())
            .as_deref(),
        Some("mistral:7b")
    );
    assert_eq!(desk.system_texts(), vec!["✅ Switched to mistral:7b"]);
    assert_eq!(desk.texts_from(Sender::User), vec!["use mistral"]);
    assert_eq!(desk.backend.count(CommandName::ChatMessage), 0);
}

#[tokio::test]
async fn switch_phrase_without_match_lists_models() {
    let desk = chat_ready(&["llama2:7b", "mistral:7b"]).await;

    desk.controller.send_message("switch to falcon").await;

    assert_eq!(
        desk.system_texts(),
        vec![commands::model_not_found_message(
            "falcon",
            &["llama2:7b", "mistral:7b"]
        )]
    );
    assert_eq!(
        desk.controller.read(|s| s.selector.selected.clone()).as_deref(),
        Some("llama2:7b")
    );
}

#[tokio::test]
async fn clear_command_calls_backend_once() {
    let desk = chat_ready(&["llama2:7b"]).await;

    desk.controller.send_message("/clear").await;

    assert_eq!(
        desk.backend.calls_to(CommandName::ClearConversation),
        vec![vec![json!("llama2:7b")]]
    );
    assert_eq!(
        desk.system_texts(),
        vec![commands::cleared_message("llama2:7b")]
    );
    assert_eq!(desk.backend.count(CommandName::ChatMessage), 0);
}

#[tokio::test]
async fn refused_clear_reports_one_failure() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ClearConversation,
        Ok(json!({"success": false, "error": "conversation locked"})),
    );

    desk.controller.send_message("please clear conversation").await;

    assert_eq!(desk.backend.count(CommandName::ClearConversation), 1);
    assert_eq!(
        desk.system_texts(),
        vec![commands::clear_failed_message("conversation locked")]
    );
    assert_eq!(desk.backend.count(CommandName::ChatMessage), 0);
}

#[tokio::test]
async fn history_counts_half_exchanges() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::GetConversationHistory,
        Ok(json!({"success": true, "history": [{}, {}, {}]})),
    );

    desk.controller.send_message("/history").await;
    desk.controller.send_message("show history").await;

    assert_eq!(
        desk.system_texts(),
        vec!["📚 Conversation has 1.5 exchanges", commands::NO_HISTORY]
    );
}

#[tokio::test]
async fn help_is_answered_locally() {
    let desk = chat_ready(&["llama2:7b"]).await;
    let calls = desk.backend.total_calls();

    desk.controller.send_message("help").await;

    assert_eq!(desk.system_texts(), vec![commands::HELP_TEXT]);
    assert_eq!(desk.backend.total_calls(), calls);
}

#[tokio::test]
async fn external_drive_refusal_points_to_settings() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Ok(json!({
            "success": false,
            "error": "No external drive configured",
            "requiresExternalDrive": true
        })),
    );

    desk.controller.send_message("hi").await;

    assert_eq!(desk.system_texts(), vec![commands::EXTERNAL_STORAGE_REQUIRED]);
}

#[tokio::test]
async fn not_running_error_adds_hint() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Ok(json!({"success": false, "error": "Ollama is not running"})),
    );

    desk.controller.send_message("hi").await;

    let texts = desk.system_texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "❌ Error: Ollama is not running");
    assert!(texts[1].contains("ollama serve"));
}

#[tokio::test]
async fn rejected_call_is_unexpected_error() {
    let desk = chat_ready(&["llama2:7b"]).await;
    desk.backend.queue(
        CommandName::ChatMessage,
        Err(json!({"message": "backend crashed"})),
    );

    desk.controller.send_message("hi").await;

    assert_eq!(
        desk.system_texts(),
        vec![commands::unexpected_error_message("backend crashed")]
    );
    assert!(!desk.controller.read(|s| s.session.request_in_flight));
}
