#![deny(unsafe_code)]

/// URL-to-site-name rewriting for chat message text.
pub mod format;
/// Static site directory and domain lookup.
pub mod sites;

pub use format::format_message_text;
pub use sites::{KNOWN_SITES, WebsiteInfo, lookup};
