//! Integration test binary. Every controller scenario runs against an
//! in-process scripted backend.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]


mod chat_flow;
mod download_flow;
mod drive_flow;
mod runtime_fallback;
