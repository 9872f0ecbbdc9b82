//! Backend URL helpers.
//!
//! Base URLs are stored without trailing slashes so endpoint paths can be
//! appended without producing `//`.

/// Strip trailing slashes from a base URL.
///
/// ```
/// use omnichat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.openai.com/v1/"), "https://api.openai.com/v1");
/// assert_eq!(normalize_base_url("http://localhost:8080//"), "http://localhost:8080");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use omnichat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.openai.com/v1/", "/chat/completions"),
///     "https://api.openai.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

/// Normalized base URL, or `None` unless it is an http(s) URL with a host.
pub fn parse_base_url(value: &str) -> Option<String> {
    let normalized = normalize_base_url(value);
    let rest = normalized
        .strip_prefix("https://")
        .or_else(|| normalized.strip_prefix("http://"))?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_repeated_slashes_and_padding() {
        assert_eq!(normalize_base_url(" https://api.openai.com/v1/// "), "https://api.openai.com/v1");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn completion_endpoint_is_joined_once() {
        for base in ["https://api.openai.com/v1", "https://api.openai.com/v1/"] {
            assert_eq!(
                construct_api_url(base, "chat/completions"),
                "https://api.openai.com/v1/chat/completions"
            );
        }
        assert_eq!(
            construct_api_url("http://127.0.0.1:9000", "///chat/completions"),
            "http://127.0.0.1:9000/chat/completions"
        );
    }

    #[test]
    fn base_urls_need_scheme_and_host() {
        assert_eq!(
            parse_base_url("http://localhost:8080/v1/"),
            Some("http://localhost:8080/v1".to_string())
        );
        assert_eq!(parse_base_url("api.openai.com/v1"), None);
        assert_eq!(parse_base_url("https:///v1"), None);
        assert_eq!(parse_base_url("ftp://example.com"), None);
        assert_eq!(parse_base_url("https://exa mple.com"), None);
    }
}
