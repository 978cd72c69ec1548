//! Request-boundary validation and normalization helpers.

/// Whether `code` looks like a two-letter lowercase ISO language code.
#[must_use]
pub fn is_valid_language_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Normalize a video URL for fingerprinting and deduplication:
/// lowercase the scheme and host, strip a trailing slash, and collapse
/// percent-encoded octets to their canonical lowercase hex form.
///
/// Plain filesystem paths (no `scheme://`) are returned with only the
/// trailing-slash and percent-encoding normalization applied.
#[must_use]
pub fn normalize_video_url(raw: &str) -> String {
    let collapsed = collapse_percent_encoding(raw);
    let Some(scheme_end) = collapsed.find("://") else {
        return strip_trailing_slash(&collapsed);
    };

    let (scheme, rest) = collapsed.split_at(scheme_end);
    let rest = &rest[3..];
    let (authority, path) = rest.find('/').map_or((rest, ""), |idx| rest.split_at(idx));

    let normalized = format!(
        "{}://{}{}",
        scheme.to_ascii_lowercase(),
        authority.to_ascii_lowercase(),
        path
    );
    strip_trailing_slash(&normalized)
}

fn strip_trailing_slash(value: &str) -> String {
    if value.len() > 1 && value.ends_with('/') {
        value[..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn collapse_percent_encoding(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' && idx + 2 < bytes.len() {
            let hex = &raw[idx + 1..idx + 3];
            if hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                out.push('%');
                out.push_str(&hex.to_ascii_uppercase());
                idx += 3;
                continue;
            }
        }
        out.push(bytes[idx] as char);
        idx += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_code_validation() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("he"));
        assert!(!is_valid_language_code("EN"));
        assert!(!is_valid_language_code("eng"));
        assert!(!is_valid_language_code(""));
    }

    #[test]
    fn url_normalization_lowercases_scheme_and_host() {
        assert_eq!(
            normalize_video_url("HTTP://Example.COM/movie.mkv"),
            "http://example.com/movie.mkv"
        );
    }

    #[test]
    fn url_normalization_strips_trailing_slash() {
        assert_eq!(
            normalize_video_url("http://example.com/dir/"),
            "http://example.com/dir"
        );
        assert_eq!(normalize_video_url("/"), "/");
    }

    #[test]
    fn url_normalization_collapses_percent_encoding_case() {
        assert_eq!(
            normalize_video_url("http://example.com/my%2dmovie.mkv"),
            "http://example.com/my%2Dmovie.mkv"
        );
    }

    #[test]
    fn local_paths_are_normalized_without_a_scheme() {
        assert_eq!(normalize_video_url("/media/Movie.mkv/"), "/media/Movie.mkv");
    }
}
