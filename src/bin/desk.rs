//! Terminal front-end for the desk controller.
//!
//! Spawns the backend process, drives the controller from stdin and prints
//! every view-model update to stdout. Lines starting with `:` are commands
//! (`:help` lists them); anything else is sent as chat input. Tracing goes
//! to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use ollama_desk::catalog::CardButton;
use ollama_desk::drives::DriveListing;
use ollama_desk::host::stdio::StdioGateway;
use ollama_desk::tools::{AnalyzerAction, CoderAction, ToolKind, ToolResult};
use ollama_desk::transcript::Sender;
use ollama_desk::ui::views::ViewName;
use ollama_desk::{DeskConfig, DeskController, Prompter, UiUpdate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Desktop chat front-end for a local Ollama runtime.
#[derive(Parser)]
#[command(name = "ollama-desk", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend program to spawn (overrides the config file).
    #[arg(long)]
    backend: Option<String>,

    /// Arguments passed to the backend program.
    #[arg(last = true)]
    backend_args: Vec<String>,
}

const COMMANDS: &str = "\
:view <home|chat|models|settings|analyzer|coder>
:select <model>            pick a model from the dropdown
:use <model>               switch chat to a downloaded model
:download <base> <variant> download a catalog model
:delete <model>            delete a downloaded model
:open                      reveal the models folder
:refresh                   reload models and status
:drives                    rescan external drives
:use-drive <name> <path>   store models on a drive
:eject <name> [force]      eject a drive
:analyze <analyze|summarize|extract> <model> <text>
:code <generate|review|explain> <language> <model> <text>
:quit";

/// Stdin lines, shared between the command loop and dialogs.
type Lines = Arc<Mutex<mpsc::Receiver<String>>>;

struct TerminalPrompter {
    lines: Lines,
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> bool {
        println!("{message}\n[y/N]");
        let answer = self.lines.lock().await.recv().await.unwrap_or_default();
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    async fn alert(&self, message: &str) {
        println!("! {message}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ollama_desk=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(DeskConfig::default_config_path);
    let mut config = DeskConfig::load_or_default(&config_path)?;
    if let Some(backend) = cli.backend {
        config.backend.command = backend;
        config.backend.args = cli.backend_args;
    }

    let gateway = StdioGateway::spawn(
        &config.backend.command,
        &config.backend.args,
        config.backend.event_capacity,
    )
    .map_err(|e| anyhow::anyhow!("failed to start backend `{}`: {e}", config.backend.command))?;

    let lines = spawn_stdin_reader();
    let prompter = Arc::new(TerminalPrompter {
        lines: Arc::clone(&lines),
    });
    let controller = DeskController::new(Arc::new(gateway), &config, prompter);
    let printer = tokio::spawn(print_updates(controller.clone()));

    controller.start().await;
    println!("Type a message, or :help for commands.");

    loop {
        let Some(line) = lines.lock().await.recv().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }
        match line.strip_prefix(':') {
            Some(command) => run_command(&controller, command).await,
            None => controller.send_message(line).await,
        }
    }

    info!("shutting down");
    controller.shutdown();
    printer.abort();
    Ok(())
}

fn spawn_stdin_reader() -> Lines {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

async fn run_command(controller: &DeskController, command: &str) {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("help", _) => println!("{COMMANDS}"),
        ("view", [view]) => {
            if !controller.switch_view(view).await {
                println!("unknown view: {view}");
            }
        }
        ("select", [model]) => {
            if !controller.select_model(model).await {
                println!("{model} is not in the model list");
            }
        }
        ("use", [model]) => controller.use_model(model),
        ("download", [base, variant]) => {
            if controller.read(|s| s.cards.is_empty()) {
                controller.switch_view(ViewName::Models.as_str()).await;
            }
            if !controller.download(base, variant).await {
                println!("{base}:{variant} cannot be downloaded right now");
            }
        }
        ("delete", [model]) => {
            controller.delete_model(model).await;
        }
        ("open", []) => controller.open_models_location().await,
        ("refresh", []) => controller.refresh_models().await,
        ("drives", []) => controller.refresh_drives().await,
        ("use-drive", [name, path @ ..]) if !path.is_empty() => {
            controller.activate_drive(name, &path.join(" ")).await;
        }
        ("eject", [name]) => controller.eject_drive(name, false).await,
        ("eject", [name, "force"]) => controller.eject_drive(name, true).await,
        ("analyze", [action, model, text @ ..]) => match AnalyzerAction::parse(action) {
            Some(action) => {
                controller
                    .analyze_text(action, &text.join(" "), Some(*model))
                    .await;
            }
            None => println!("unknown analyzer action: {action}"),
        },
        ("code", [action, language, model, text @ ..]) => match CoderAction::parse(action) {
            Some(action) => {
                controller
                    .process_code(action, language, &text.join(" "), Some(*model))
                    .await;
            }
            None => println!("unknown code action: {action}"),
        },
        _ => println!("unrecognized command; :help lists them"),
    }
}

async fn print_updates(controller: DeskController) {
    let mut updates = controller.subscribe();
    while let Ok(update) = updates.recv().await {
        print_update(&controller, &update);
    }
}

fn print_update(controller: &DeskController, update: &UiUpdate) {
    match update {
        UiUpdate::View(view) => println!("== {view} =="),
        UiUpdate::Connection(state) => println!("[status] {}", state.label()),
        UiUpdate::MessageAppended(message) => {
            let who = match message.sender {
                Sender::User => "you",
                Sender::Assistant => "assistant",
                Sender::System => "system",
            };
            println!("[{}] {who}: {}", message.time_label(), message.text);
            if let Some(meta) = &message.metadata {
                let tokens = meta
                    .token_count
                    .map(|t| format!(", {t} tokens"))
                    .unwrap_or_default();
                println!("    ({} in {} ms{tokens})", meta.model_name, meta.response_time_ms);
            }
        }
        UiUpdate::Typing(true) => {
            let model = controller.read(|s| s.typing.as_ref().map(|t| t.model.clone()));
            println!("{} is thinking...", model.unwrap_or_default());
        }
        UiUpdate::Typing(false) => {}
        UiUpdate::Selector => controller.read(|s| {
            if let Some(placeholder) = &s.selector.placeholder {
                println!("[models] {placeholder}");
            }
            for option in &s.selector.options {
                let mark = if s.selector.selected.as_deref() == Some(option.value.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("  {mark} {}", option.label);
            }
        }),
        UiUpdate::Cards => controller.read(|s| {
            for card in &s.cards {
                if card.button != CardButton::Download {
                    println!("  {} ({}) [{}]", card.key, card.size, card.button.label());
                }
            }
        }),
        UiUpdate::Progress(id) => controller.read(|s| {
            if let Some(slot) = s.progress.slot(id).filter(|slot| slot.visible) {
                println!("  {id}: {:.0}% {}", slot.fill, slot.text);
            }
        }),
        UiUpdate::DownloadedModels => controller.read(|s| {
            for model in &s.downloaded_models {
                println!("  {} {}", model.name, model.size.as_deref().unwrap_or_default());
            }
        }),
        UiUpdate::Drives => controller.read(|s| match &s.drives.listing {
            DriveListing::Empty => {}
            DriveListing::Placeholder(text) => println!("[drives] {text}"),
            DriveListing::Rows(rows) => {
                for row in rows {
                    println!(
                        "  {} {} [{}]",
                        row.drive.name,
                        row.drive.path,
                        row.button.label()
                    );
                }
            }
        }),
        UiUpdate::Storage => controller.read(|s| {
            if let Some(banner) = &s.storage {
                println!("[storage] {} {}\n  {}", banner.label(), banner.path, banner.note);
            }
        }),
        UiUpdate::Home => controller.read(|s| {
            println!(
                "[home] downloaded: {}, storage: {}, active: {}",
                s.home.downloaded_count,
                s.home.storage.label(),
                s.home.active_model
            );
        }),
        UiUpdate::Tool(kind) => controller.read(|s| {
            let label = match kind {
                ToolKind::Analyzer => "analyzer",
                ToolKind::Coder => "coder",
            };
            match &s.tool(*kind).result {
                ToolResult::Idle => {}
                ToolResult::Loading => println!("[{label}] {}", kind.loading_text()),
                ToolResult::Output(text) | ToolResult::Error(text) => println!("[{label}] {text}"),
            }
        }),
        UiUpdate::Notice(text) => println!("{text}"),
    }
}
