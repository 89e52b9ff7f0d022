//! Blocking user dialogs.

use async_trait::async_trait;

/// Confirmation and alert dialogs.
///
/// The controller awaits these inline, so an implementation may block on
/// user input.
#[async_trait]
pub trait Prompter: Send + Sync + 'static {
    /// Ask a yes/no question. `true` means the user accepted.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a message the user must acknowledge.
    async fn alert(&self, message: &str);
}
