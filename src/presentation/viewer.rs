// Opens rendered artifacts in the default browser
use std::path::Path;

/// Best effort: failure to launch a browser is logged, not fatal.
pub fn open_in_browser(path: &Path) {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match open::that(&target) {
        Ok(()) => tracing::info!("Opened {}", target.display()),
        Err(e) => tracing::warn!("Could not open {}: {}", target.display(), e),
    }
}
