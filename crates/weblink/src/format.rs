use std::sync::OnceLock;

use regex::Regex;

use crate::sites::lookup;

/// Matches `http(s)://` followed by a run of non-whitespace.
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"))
}

/// Rewrites every recognized URL in `text` to its friendly site name.
///
/// URLs whose host is not in the site directory are left exactly as written,
/// and non-URL text is never touched.
pub fn format_message_text(text: &str) -> String {
    url_regex()
        .replace_all(text, |captures: &regex::Captures<'_>| {
            let url = &captures[0];
            match lookup(url) {
                Some(info) => info.name.to_string(),
                None => url.to_string(),
            }
        })
        .into_owned()
}
