//! Candidate configuration file paths across system, user and local scopes.
//!
//! Responsibilities:
//! - Construct the ordered sequence of candidate paths (lowest to highest
//!   precedence): system dirs, then the user dir, then the working directory.
//! - Filter by scope and existence for `config ls`.
//!
//! Does NOT handle:
//! - Reading or parsing the files (see file.rs).
//!
//! Path construction itself never fails; a missing user config dir simply
//! contributes no candidate.

use std::path::PathBuf;

use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME};

/// Configuration file scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Platform-wide directories, zero or more, lowest precedence.
    System,
    /// The per-user configuration directory.
    User,
    /// The current working directory, highest precedence.
    Local,
}

fn system_config_dirs() -> Vec<PathBuf> {
    if cfg!(windows) {
        return std::env::var_os("PROGRAMDATA")
            .map(|d| vec![PathBuf::from(d).join(APP_DIR_NAME)])
            .unwrap_or_default();
    }

    let dirs = std::env::var("XDG_CONFIG_DIRS").unwrap_or_default();
    let dirs = if dirs.trim().is_empty() {
        "/etc/xdg".to_string()
    } else {
        dirs
    };
    dirs.split(':')
        .filter(|d| !d.trim().is_empty())
        .map(|d| PathBuf::from(d).join(APP_DIR_NAME))
        .collect()
}

fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_DIR_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// All candidate config file paths, ordered from lowest to highest precedence.
pub fn candidate_paths() -> Vec<(Scope, PathBuf)> {
    let mut paths: Vec<(Scope, PathBuf)> = system_config_dirs()
        .into_iter()
        .map(|d| (Scope::System, d.join(CONFIG_FILE_NAME)))
        .collect();

    if let Some(dir) = user_config_dir() {
        paths.push((Scope::User, dir.join(CONFIG_FILE_NAME)));
    }

    paths.push((Scope::Local, PathBuf::from(".").join(CONFIG_FILE_NAME)));
    paths
}

/// Candidate paths restricted to the union of `scopes` (empty slice means
/// all scopes), filtered to existing files unless `include_missing` is set.
pub fn list_paths(scopes: &[Scope], include_missing: bool) -> Vec<PathBuf> {
    candidate_paths()
        .into_iter()
        .filter(|(scope, _)| scopes.is_empty() || scopes.contains(scope))
        .map(|(_, path)| path)
        .filter(|path| include_missing || path.exists())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn order_is_system_then_user_then_local() {
        temp_env::with_vars([("XDG_CONFIG_DIRS", Some("/sys1:/sys2"))], || {
            let paths = candidate_paths();
            let scopes: Vec<Scope> = paths.iter().map(|(s, _)| *s).collect();

            assert_eq!(scopes.first(), Some(&Scope::System));
            assert_eq!(scopes.last(), Some(&Scope::Local));

            let system: Vec<_> = paths
                .iter()
                .filter(|(s, _)| *s == Scope::System)
                .map(|(_, p)| p.clone())
                .collect();
            assert_eq!(
                system,
                vec![
                    PathBuf::from("/sys1/qcloud/qcloud.conf"),
                    PathBuf::from("/sys2/qcloud/qcloud.conf"),
                ]
            );
        });
    }

    #[test]
    #[serial]
    fn every_candidate_uses_the_fixed_file_name() {
        for (_, path) in candidate_paths() {
            assert_eq!(
                path.file_name().and_then(|n| n.to_str()),
                Some(CONFIG_FILE_NAME)
            );
        }
    }

    #[test]
    #[serial]
    fn scope_filter_restricts_to_requested_union() {
        temp_env::with_vars([("XDG_CONFIG_DIRS", Some("/sys1"))], || {
            let local = list_paths(&[Scope::Local], true);
            assert_eq!(local, vec![PathBuf::from("./qcloud.conf")]);

            let system = list_paths(&[Scope::System], true);
            assert_eq!(system, vec![PathBuf::from("/sys1/qcloud/qcloud.conf")]);

            let both = list_paths(&[Scope::System, Scope::Local], true);
            assert_eq!(both.len(), 2);
        });
    }

    #[test]
    #[serial]
    fn existence_filter_drops_missing_files() {
        temp_env::with_vars([("XDG_CONFIG_DIRS", Some("/nonexistent-dir"))], || {
            let paths = list_paths(&[Scope::System], false);
            assert!(paths.is_empty());
        });
    }
}
