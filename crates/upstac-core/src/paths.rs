use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const UPSTAC_DIR: &str = ".upstac";
pub const REQUESTS_DIR: &str = ".upstac/requests";
pub const CONFIG_FILE: &str = ".upstac/config.yaml";

/// Lock file inside the requests directory guarding id allocation and saves.
pub const STORE_LOCK_FILE: &str = ".lock";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn upstac_dir(root: &Path) -> PathBuf {
    root.join(UPSTAC_DIR)
}

pub fn requests_dir(root: &Path) -> PathBuf {
    root.join(REQUESTS_DIR)
}

pub fn request_path(root: &Path, id: u64) -> PathBuf {
    requests_dir(root).join(format!("{id}.yaml"))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Parse a request id back out of a `<id>.yaml` file name.
pub fn request_id_from_file(name: &str) -> Option<u64> {
    name.strip_suffix(".yaml")?.parse().ok()
}
