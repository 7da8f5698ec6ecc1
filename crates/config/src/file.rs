//! Parsing and rendering of profile-sectioned configuration files.
//!
//! The format is INI-like text: an optional `[defaults]` section whose
//! options are inherited by every profile, and zero or more `[profile-name]`
//! sections of flat `option = value` lines. Option names are
//! case-insensitive (stored lowercased); profile names are case-sensitive
//! and must be unique within a file. First-occurrence order of profiles is
//! preserved for listing; lookup by name is order-independent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const DEFAULTS_SECTION: &str = "defaults";

/// A named, independently selectable set of options within one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSection {
    pub name: String,
    pub options: BTreeMap<String, String>,
}

/// A parsed configuration file.
///
/// Parsed fresh on every resolution call and never mutated in place;
/// updates construct new full content and rewrite the file wholesale.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub defaults: BTreeMap<String, String>,
    profiles: Vec<ProfileSection>,
}

impl ConfigFile {
    /// An empty config file associated with `path` (nothing on disk).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: BTreeMap::new(),
            profiles: Vec::new(),
        }
    }

    /// Read and parse the file at `path`.
    ///
    /// A missing file is `ConfigError::FileNotFound`; a present but empty
    /// file parses successfully.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parse `text` as the contents of a config file at `path`.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut file = Self::empty(path.clone());
        // None until the first section header; options before any header
        // are a parse error.
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let lineno = idx + 1;

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(parse_error(&path, lineno, "unterminated section header"));
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(parse_error(&path, lineno, "empty section name"));
                }
                if !name.eq_ignore_ascii_case(DEFAULTS_SECTION)
                    && file.profiles.iter().any(|p| p.name == name)
                {
                    return Err(parse_error(
                        &path,
                        lineno,
                        &format!("duplicate profile '{name}'"),
                    ));
                }
                if !name.eq_ignore_ascii_case(DEFAULTS_SECTION) {
                    file.profiles.push(ProfileSection {
                        name: name.to_string(),
                        options: BTreeMap::new(),
                    });
                }
                current = Some(name.to_string());
                continue;
            }

            let Some((key, value)) = split_assignment(line) else {
                return Err(parse_error(&path, lineno, "expected 'option = value'"));
            };
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return Err(parse_error(&path, lineno, "empty option name"));
            }
            let value = value.trim().to_string();

            match &current {
                None => return Err(parse_error(&path, lineno, "option outside any section")),
                Some(section) if section.eq_ignore_ascii_case(DEFAULTS_SECTION) => {
                    file.defaults.insert(key, value);
                }
                Some(section) => {
                    let profile = file
                        .profiles
                        .iter_mut()
                        .find(|p| &p.name == section)
                        .expect("current section was pushed on header");
                    profile.options.insert(key, value);
                }
            }
        }

        Ok(file)
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Option<&ProfileSection> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The first profile in file order, if any.
    pub fn first_profile(&self) -> Option<&ProfileSection> {
        self.profiles.first()
    }

    /// Profile names in first-occurrence order. The defaults section is
    /// never listed.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    /// Set an option in the named profile, creating the profile if needed.
    pub fn set_option(&mut self, profile: &str, key: &str, value: &str) {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        if profile.eq_ignore_ascii_case(DEFAULTS_SECTION) {
            self.defaults.insert(key, value);
            return;
        }
        match self.profiles.iter_mut().find(|p| p.name == profile) {
            Some(section) => {
                section.options.insert(key, value);
            }
            None => {
                let mut options = BTreeMap::new();
                options.insert(key, value);
                self.profiles.push(ProfileSection {
                    name: profile.to_string(),
                    options,
                });
            }
        }
    }

    /// Render the file back to INI-like text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.defaults.is_empty() {
            out.push_str("[defaults]\n");
            for (key, value) in &self.defaults {
                out.push_str(&format!("{key} = {value}\n"));
            }
            out.push('\n');
        }
        for profile in &self.profiles {
            out.push_str(&format!("[{}]\n", profile.name));
            for (key, value) in &profile.options {
                out.push_str(&format!("{key} = {value}\n"));
            }
            out.push('\n');
        }
        out
    }
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    // '=' preferred; ':' accepted for parity with common INI dialects.
    let pos = line.find(['=', ':'])?;
    Some((&line[..pos], &line[pos + 1..]))
}

fn parse_error(path: &Path, line: usize, message: &str) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}
