//! Whole-file configuration updates.
//!
//! No partial in-place edits: prior content is read entirely, new full
//! content is constructed in memory, and the file is rewritten through a
//! temporary file renamed into place.

use std::path::Path;

use crate::error::ConfigError;
use crate::file::ConfigFile;

/// Create or update `profile` in the config file at `path`, setting the
/// given options. Returns the file content as written.
pub fn update_profile(
    path: &Path,
    profile: &str,
    options: &[(String, String)],
) -> Result<ConfigFile, ConfigError> {
    let mut file = match ConfigFile::load(path) {
        Ok(file) => file,
        Err(ConfigError::FileNotFound { .. }) => ConfigFile::empty(path),
        Err(e) => return Err(e),
    };

    for (key, value) in options {
        file.set_option(profile, key, value);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("conf.tmp");
    std::fs::write(&tmp, file.render())?;
    std::fs::rename(&tmp, path)?;

    tracing::info!(path = %path.display(), profile, "configuration written");
    Ok(file)
}
