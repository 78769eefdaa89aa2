#![deny(unsafe_code)]

/// FAQ kiosk shell and window chrome.
///
/// This crate provides a desktop FAQ chat kiosk built with GPUI and
/// gpui-component. Questions are delivered through `kiosk-client` and answers
/// land in a single append-only conversation.
pub mod app;
/// Chat domain model, components, and answer orchestration.
pub mod chat;
/// Endpoint configuration loaded from disk and environment.
pub mod settings;
/// Returns a stable marker used by integration smoke tests.
pub fn smoke_marker() -> &'static str {
    "kiosk"
}
