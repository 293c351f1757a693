use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// An explicit `--root` / `UPSTAC_ROOT` wins. Otherwise walk upward from the
/// current directory looking for `.upstac/`, falling back to the current
/// directory so that `upstac init` works anywhere.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(upstac_core::paths::UPSTAC_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_upstac_dir_from_nested_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".upstac")).unwrap();
        let nested = dir.path().join("reports/2026");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_upward(&nested).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_marker_means_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_upward(dir.path()), None);
    }
}
