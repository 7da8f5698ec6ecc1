//! Environment variable tier of configuration resolution.
//!
//! One variable per recognized option; empty or whitespace-only values are
//! treated as unset and returned values are trimmed.

/// Read an environment variable, returning None if unset, empty, or
/// whitespace-only. The returned value is trimmed.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Environment variable for a recognized option name, if one is defined.
pub(crate) fn env_var_name(option: &str) -> Option<&'static str> {
    Some(match option {
        "endpoint" => "QCLOUD_API_ENDPOINT",
        "region" => "QCLOUD_API_REGION",
        "metadata_api_endpoint" => "QCLOUD_METADATA_API_ENDPOINT",
        "leap_api_endpoint" => "QCLOUD_LEAP_API_ENDPOINT",
        "token" => "QCLOUD_API_TOKEN",
        "client" => "QCLOUD_API_CLIENT",
        "solver" => "QCLOUD_API_SOLVER",
        "headers" => "QCLOUD_API_HEADERS",
        "cert" => "QCLOUD_API_CERT",
        "proxy" => "QCLOUD_API_PROXY",
        "permissive_ssl" => "QCLOUD_PERMISSIVE_SSL",
        "request_retry" => "QCLOUD_REQUEST_RETRY",
        "request_timeout" => "QCLOUD_REQUEST_TIMEOUT",
        "polling_timeout" => "QCLOUD_POLLING_TIMEOUT",
        _ => return None,
    })
}

/// Value of the environment variable for `option`, if set and non-empty.
pub(crate) fn env_option(option: &str) -> Option<String> {
    env_var_name(option).and_then(env_var_or_none)
}

/// Environment-designated profile name.
pub fn env_profile() -> Option<String> {
    env_var_or_none("QCLOUD_PROFILE")
}

/// Environment-designated config file path.
pub fn env_config_file() -> Option<String> {
    env_var_or_none("QCLOUD_CONFIG_FILE")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_var_or_none_filters_empty_and_whitespace() {
        let key = "_QCLOUD_TEST_VAR";
        assert!(env_var_or_none(key).is_none());

        temp_env::with_vars([(key, Some(""))], || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_vars([(key, Some("   "))], || {
            assert!(env_var_or_none(key).is_none());
        });
        temp_env::with_vars([(key, Some(" value "))], || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }

    #[test]
    fn every_recognized_option_has_a_variable() {
        for option in [
            "endpoint",
            "region",
            "metadata_api_endpoint",
            "leap_api_endpoint",
            "token",
            "client",
            "solver",
            "headers",
            "cert",
            "proxy",
            "permissive_ssl",
            "request_retry",
            "request_timeout",
            "polling_timeout",
        ] {
            assert!(env_var_name(option).is_some(), "missing variable for {option}");
        }
        assert!(env_var_name("unknown").is_none());
    }
}
