//! Small environment-variable parsing helpers shared by every config section.

use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Read a required environment variable, failing fast if unset.
pub fn required(name: &'static str) -> ConfigResult<String> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv { name })
}

/// Read an optional environment variable, falling back to `default` if unset.
pub fn optional(name: &'static str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an optional environment variable, falling back to
/// `default` if unset, failing if set but unparseable.
pub fn optional_parsed<T>(name: &'static str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read a comma-separated list, falling back to `default` (also
/// comma-separated) if unset.
pub fn optional_list(name: &'static str, default: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parsed_uses_default_when_unset() {
        let value: u32 = optional_parsed("SUBCAST_CONFIG_TEST_UNSET_KEY", 100).expect("parses");
        assert_eq!(value, 100);
    }

    #[test]
    fn optional_list_splits_and_trims() {
        let list = optional_list(
            "SUBCAST_CONFIG_TEST_UNSET_LIST",
            ".mp4, .mkv ,.avi",
        );
        assert_eq!(list, vec![".mp4", ".mkv", ".avi"]);
    }
}
