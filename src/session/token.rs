use regex::Regex;
use std::sync::LazyLock;

/// Matches `"csrf_token": "..."` in JSON and `csrf_token = "..."` in boot scripts
static CSRF_IN_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"csrf_token"?\s*[:=]\s*"([^"]+)""#).unwrap());

/// Anti-forgery token embedded in page or response content
pub fn extract_from_body(body: &str) -> Option<String> {
    CSRF_IN_BODY
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| token != "None")
}

/// Value of cookie `name` in a `Cookie` header line (`a=1; b=2`)
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Whether a login response carries the success marker.
///
/// Comparison ignores case and reads `_` as a space, so `Logged In` and
/// `logged_in` both satisfy the marker `logged in`.
pub fn has_marker(body: &str, marker: &str) -> bool {
    let normalize = |s: &str| s.to_lowercase().replace('_', " ");
    normalize(body).contains(&normalize(marker))
}
