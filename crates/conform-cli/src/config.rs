//! Options file loading.
//!
//! `conform.json` is optional: a missing file means defaults, and an
//! unreadable or malformed one logs a warning and also means defaults.

use std::path::Path;

use conform_core::VerifyOptions;
use tracing::warn;

/// File name looked up by [`load`]
pub const CONFIG_FILE: &str = "conform.json";

/// Load options from `conform.json` inside `dir`.
pub fn load(dir: &Path) -> VerifyOptions {
    load_file(&dir.join(CONFIG_FILE))
}

/// Load options from an explicit path, with the same fallback as [`load`].
pub fn load_file(path: &Path) -> VerifyOptions {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return VerifyOptions::default(),
    };
    match serde_json::from_str(&content) {
        Ok(options) => options,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse options, using defaults");
            VerifyOptions::default()
        }
    }
}
