//! Precedence and search-order tests for configuration resolution.
//!
//! The property test fuzzes each source tier independently and asserts the
//! resolved value always equals the highest-precedence non-empty source:
//! explicit argument > environment variable > profile section > defaults
//! section > built-in.

use std::path::PathBuf;

use proptest::prelude::*;
use serial_test::serial;

use qcloud_config::{ConfigError, ExplicitOptions, resolve};

fn write_conf(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("qcloud.conf");
    std::fs::write(&path, body).unwrap();
    path
}

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z][a-z0-9-]{0,12}".prop_map(String::from))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    #[serial]
    fn highest_precedence_non_empty_source_wins(
        arg in value_strategy(),
        env in value_strategy(),
        profile_value in value_strategy(),
        defaults_value in value_strategy(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::new();
        if let Some(v) = &defaults_value {
            body.push_str(&format!("[defaults]\nregion = {v}\n"));
        }
        body.push_str("[p]\n");
        if let Some(v) = &profile_value {
            body.push_str(&format!("region = {v}\n"));
        }
        let path = write_conf(&dir, &body);

        let explicit = ExplicitOptions {
            region: arg.clone(),
            ..Default::default()
        };

        let resolved = temp_env::with_vars(
            [
                ("QCLOUD_API_REGION", env.as_deref()),
                ("QCLOUD_PROFILE", None),
                ("QCLOUD_CONFIG_FILE", None),
            ],
            || resolve(&explicit, Some("p"), Some(&path)).unwrap(),
        );

        let expected = arg
            .or(env)
            .or(profile_value)
            .or(defaults_value)
            .unwrap_or_else(|| "na-west-1".to_string());
        prop_assert_eq!(resolved.region, expected);
    }
}

/// With files present at all three scopes and no explicit path, resolution
/// uses the local file; removing it falls back to user, then system.
#[test]
#[serial]
fn search_order_is_local_then_user_then_system() {
    let root = tempfile::tempdir().unwrap();
    let sys1 = root.path().join("sys1");
    let sys2 = root.path().join("sys2");
    let home = root.path().join("home");
    let local = root.path().join("local");
    for dir in [&sys1, &sys2, &home, &local] {
        std::fs::create_dir_all(dir).unwrap();
    }

    std::fs::create_dir_all(sys1.join("qcloud")).unwrap();
    std::fs::create_dir_all(sys2.join("qcloud")).unwrap();
    std::fs::write(sys1.join("qcloud/qcloud.conf"), "[p]\nregion = system-1\n").unwrap();
    std::fs::write(sys2.join("qcloud/qcloud.conf"), "[p]\nregion = system-2\n").unwrap();
    std::fs::create_dir_all(home.join("qcloud")).unwrap();
    std::fs::write(home.join("qcloud/qcloud.conf"), "[p]\nregion = user\n").unwrap();
    std::fs::write(local.join("qcloud.conf"), "[p]\nregion = local\n").unwrap();

    let xdg_dirs = format!("{}:{}", sys1.display(), sys2.display());
    let prior_cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(&local).unwrap();

    let result = temp_env::with_vars(
        [
            ("XDG_CONFIG_DIRS", Some(xdg_dirs.as_str())),
            ("XDG_CONFIG_HOME", Some(home.to_str().unwrap())),
            ("HOME", Some(root.path().to_str().unwrap())),
            ("QCLOUD_CONFIG_FILE", None),
            ("QCLOUD_PROFILE", None),
            ("QCLOUD_API_REGION", None),
        ],
        || {
            let explicit = ExplicitOptions::default();

            let resolved = resolve(&explicit, Some("p"), None).unwrap();
            assert_eq!(resolved.region, "local");

            std::fs::remove_file(local.join("qcloud.conf")).unwrap();
            let resolved = resolve(&explicit, Some("p"), None).unwrap();
            assert_eq!(resolved.region, "user");

            std::fs::remove_file(home.join("qcloud/qcloud.conf")).unwrap();
            let resolved = resolve(&explicit, Some("p"), None).unwrap();
            assert_eq!(resolved.region, "system-2");

            std::fs::remove_file(sys2.join("qcloud/qcloud.conf")).unwrap();
            let resolved = resolve(&explicit, Some("p"), None).unwrap();
            assert_eq!(resolved.region, "system-1");

            Ok::<(), ConfigError>(())
        },
    );

    std::env::set_current_dir(prior_cwd).unwrap();
    result.unwrap();
}

/// With no file anywhere, resolution still succeeds from defaults/env/args.
#[test]
#[serial]
fn resolution_without_any_file_is_valid() {
    let root = tempfile::tempdir().unwrap();
    let prior_cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(root.path()).unwrap();

    let resolved = temp_env::with_vars(
        [
            ("XDG_CONFIG_DIRS", Some(root.path().to_str().unwrap())),
            ("XDG_CONFIG_HOME", Some(root.path().to_str().unwrap())),
            ("QCLOUD_CONFIG_FILE", None),
            ("QCLOUD_PROFILE", None),
            ("QCLOUD_API_REGION", None),
        ],
        || resolve(&ExplicitOptions::default(), None, None),
    );

    std::env::set_current_dir(prior_cwd).unwrap();
    assert_eq!(resolved.unwrap().region, "na-west-1");
}
