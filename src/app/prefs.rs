// Jewel - app/prefs.rs
//
// Persisted user preferences: the chosen appearance and UI scale factor.
//
// Design principles:
// - Saved atomically (write→temp, rename→final) so a crash during save never
//   corrupts the previous good file.
// - Load errors are discarded: a missing, corrupt or incompatible file just
//   starts with defaults rather than surfacing errors to the user.
// - The data directory is created on first save.

use crate::util::error::PrefsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version stamp for forward-compatibility checks.
///
/// Version mismatches silently discard the stored preferences.
pub const PREFS_VERSION: u32 = 1;

/// On-disk preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Schema version; must equal `PREFS_VERSION` to be accepted.
    pub version: u32,

    /// Last installed appearance ("light", "dark" or "system").
    #[serde(default)]
    pub theme: Option<String>,

    /// UI scale factor. `None` means the platform default.
    #[serde(default)]
    pub ui_scale: Option<f32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            theme: None,
            ui_scale: None,
        }
    }
}

/// Save `prefs` to `path` atomically (write temp → rename).
pub fn save(prefs: &Preferences, path: &Path) -> Result<(), PrefsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json =
        serde_json::to_string_pretty(prefs).map_err(|source| PrefsError::Serialise { source })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(|source| PrefsError::Io {
        path: tmp.clone(),
        source,
    })?;

    std::fs::rename(&tmp, path).map_err(|source| {
        // Clean up the temp file on failure; ignore any secondary error.
        let _ = std::fs::remove_file(&tmp);
        PrefsError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(path = %path.display(), "Preferences saved");
    Ok(())
}

/// Load preferences from `path`, or `None` to start fresh.
pub fn load(path: &Path) -> Option<Preferences> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read preferences");
            }
        })
        .ok()?;

    let prefs: Preferences = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Preferences file is malformed; starting fresh"
            );
        })
        .ok()?;

    if prefs.version != PREFS_VERSION {
        tracing::warn!(
            found = prefs.version,
            expected = PREFS_VERSION,
            "Preferences version mismatch; starting fresh"
        );
        return None;
    }

    tracing::debug!(path = %path.display(), "Preferences loaded");
    Some(prefs)
}
