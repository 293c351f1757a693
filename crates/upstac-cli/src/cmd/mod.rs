pub mod consult;
pub mod init;
pub mod lab;
pub mod request;
pub mod serve;
pub mod user;

use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use upstac_core::config::Config;
use upstac_core::request::TestRequest;
use upstac_core::store::FileStore;
use upstac_core::user::{User, UserDirectory};
use upstac_core::UpstacError;

/// Look up the user a command acts on behalf of.
pub(crate) fn actor(root: &Path, username: &str) -> anyhow::Result<User> {
    let config = Config::load(root)?;
    config
        .find_by_username(username)
        .ok_or_else(|| UpstacError::UserNotFound(username.to_string()))
        .with_context(|| format!("cannot act as '{username}'"))
}

/// Open the request store, failing early if the project is not initialized.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<FileStore> {
    if !upstac_core::paths::upstac_dir(root).is_dir() {
        return Err(UpstacError::NotInitialized.into());
    }
    Ok(FileStore::new(root))
}

pub(crate) fn print_requests(requests: &[TestRequest], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&requests);
    }
    if requests.is_empty() {
        println!("No test requests.");
        return Ok(());
    }
    let rows = requests
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.status.to_string(),
                r.name.clone(),
                r.assigned_tester
                    .as_ref()
                    .map(|a| a.username.clone())
                    .unwrap_or_else(|| "-".into()),
                r.assigned_doctor
                    .as_ref()
                    .map(|a| a.username.clone())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "NAME", "TESTER", "DOCTOR"], rows);
    Ok(())
}

/// One-line summary after a transition.
pub(crate) fn print_transition(request: &TestRequest, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(request);
    }
    println!("Request {} is now {}", request.id, request.status);
    Ok(())
}
