use std::sync::LazyLock;

use regex::Regex;

/// SSH shorthand or HTTP(S) GitHub remotes, with an optional `.git` suffix.
static GITHUB_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(git@github\.com:|https?://github\.com/)([^/]+)/(.*?)(\.git)?$")
        .expect("remote pattern is valid")
});

/// Canonicalize a remote URI to `https://github.com/<org>/<name>`.
///
/// Unrecognized URIs are returned unchanged.
pub fn https_origin(uri: &str) -> String {
    GITHUB_REMOTE
        .replace_all(uri, "https://github.com/$2/$3")
        .into_owned()
}
