/// Display metadata for one known website.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebsiteInfo {
    pub name: &'static str,
    pub logo: &'static str,
    pub domain: &'static str,
}

/// Site directory scanned in declaration order.
///
/// This is deliberately an ordered slice rather than a map: several keys
/// overlap as substrings (`ulm.edu` vs `portal.ulm.edu`), and the first
/// matching entry wins, so precedence must stay fixed.
pub const KNOWN_SITES: &[(&str, WebsiteInfo)] = &[
    (
        "youtube.com",
        WebsiteInfo {
            name: "YouTube",
            logo: "https://www.google.com/s2/favicons?domain=youtube.com&sz=64",
            domain: "youtube.com",
        },
    ),
    (
        "facebook.com",
        WebsiteInfo {
            name: "Facebook",
            logo: "https://www.google.com/s2/favicons?domain=facebook.com&sz=64",
            domain: "facebook.com",
        },
    ),
    (
        "twitter.com",
        WebsiteInfo {
            name: "Twitter",
            logo: "https://www.google.com/s2/favicons?domain=twitter.com&sz=64",
            domain: "twitter.com",
        },
    ),
    (
        "instagram.com",
        WebsiteInfo {
            name: "Instagram",
            logo: "https://www.google.com/s2/favicons?domain=instagram.com&sz=64",
            domain: "instagram.com",
        },
    ),
    (
        "linkedin.com",
        WebsiteInfo {
            name: "LinkedIn",
            logo: "https://www.google.com/s2/favicons?domain=linkedin.com&sz=64",
            domain: "linkedin.com",
        },
    ),
    (
        "github.com",
        WebsiteInfo {
            name: "GitHub",
            logo: "https://www.google.com/s2/favicons?domain=github.com&sz=64",
            domain: "github.com",
        },
    ),
    (
        "google.com",
        WebsiteInfo {
            name: "Google",
            logo: "https://www.google.com/s2/favicons?domain=google.com&sz=64",
            domain: "google.com",
        },
    ),
    (
        "ulm.edu",
        WebsiteInfo {
            name: "ULM",
            logo: "https://www.google.com/s2/favicons?domain=ulm.edu&sz=64",
            domain: "ulm.edu",
        },
    ),
    (
        "portal.ulm.edu",
        WebsiteInfo {
            name: "ULM Portal",
            logo: "https://www.google.com/s2/favicons?domain=ulm.edu&sz=64",
            domain: "portal.ulm.edu",
        },
    ),
    (
        "catalog.ulm.edu",
        WebsiteInfo {
            name: "ULM Catalog",
            logo: "https://www.google.com/s2/favicons?domain=ulm.edu&sz=64",
            domain: "catalog.ulm.edu",
        },
    ),
];

/// Resolves a URL or bare domain to its directory entry.
///
/// Strips a leading `https://`/`http://` scheme and a `www.` prefix when
/// present, keeps everything up to the first `/`, lowercases it, and returns
/// the first entry whose key is a substring of that host. Unknown hosts, and
/// inputs whose scheme is anything other than http(s), resolve to `None`.
pub fn lookup(url: &str) -> Option<&'static WebsiteInfo> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let host = match rest.split_once('/') {
        Some((host, _)) => host,
        None => rest,
    };
    let host = host.to_ascii_lowercase();

    for (key, info) in KNOWN_SITES {
        if host.contains(*key) {
            return Some(info);
        }
    }

    None
}
