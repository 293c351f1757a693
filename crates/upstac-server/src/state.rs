use std::path::PathBuf;
use std::sync::Arc;
use upstac_core::store::FileStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub store: Arc<FileStore>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        let store = Arc::new(FileStore::new(root.clone()));
        Self { root, store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_shares_root_with_store() {
        let state = AppState::new(PathBuf::from("/tmp/lab"));
        assert_eq!(state.root, PathBuf::from("/tmp/lab"));
        assert_eq!(state.store.root(), state.root.as_path());
    }
}
