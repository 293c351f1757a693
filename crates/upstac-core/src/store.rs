use crate::error::{Result, UpstacError};
use crate::paths;
use crate::request::TestRequest;
use crate::types::RequestStatus;
use crate::user::ActorRef;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// TestRequestStore
// ---------------------------------------------------------------------------

/// Persistence for test requests.
///
/// `save` is a compare-and-swap on `TestRequest::version`: it succeeds only if
/// the stored record still carries the version the caller loaded, and returns
/// the record with its version bumped. A stale write fails with
/// [`UpstacError::Conflict`] and leaves the stored record untouched.
pub trait TestRequestStore: Send + Sync {
    fn get(&self, id: u64) -> Result<TestRequest>;

    /// Store a new request under the next free id. The incoming id and version are ignored.
    fn insert(&self, request: TestRequest) -> Result<TestRequest> {
        self.insert_unique(request, &|_| Ok(()))
    }

    /// Like [`insert`](Self::insert), but first hands every stored request to
    /// `admit`; an error from it aborts the insert. The check and the write
    /// happen in one critical section, so a rule such as "one open request
    /// per person" cannot be raced.
    fn insert_unique(
        &self,
        request: TestRequest,
        admit: &dyn Fn(&[TestRequest]) -> Result<()>,
    ) -> Result<TestRequest>;

    fn save(&self, request: &TestRequest) -> Result<TestRequest>;

    /// All requests, oldest first (ties broken by id).
    fn list(&self) -> Result<Vec<TestRequest>>;

    fn query_by_status(&self, status: RequestStatus) -> Result<Vec<TestRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.status == status)
            .collect())
    }

    fn query_by_assigned_tester(&self, actor: &ActorRef) -> Result<Vec<TestRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.assigned_tester.as_ref().is_some_and(|t| t.id == actor.id))
            .collect())
    }

    fn query_by_assigned_doctor(&self, actor: &ActorRef) -> Result<Vec<TestRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.assigned_doctor.as_ref().is_some_and(|d| d.id == actor.id))
            .collect())
    }

    fn query_by_creator(&self, actor: &ActorRef) -> Result<Vec<TestRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.created_by.id == actor.id)
            .collect())
    }
}

fn sort_requests(requests: &mut [TestRequest]) {
    requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

fn check_version(current: &TestRequest, incoming: &TestRequest) -> Result<()> {
    if current.version != incoming.version {
        return Err(UpstacError::Conflict {
            id: incoming.id,
            expected: incoming.version,
            found: current.version,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One YAML document per request under `.upstac/requests/`.
///
/// Every write runs under an exclusive `flock` on `.upstac/requests/.lock`,
/// so separate processes (the CLI and `upstac serve`) sharing one project
/// still see each other's version bumps and id allocations.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Block until this process holds the store lock. Released when the file drops.
    fn lock(&self) -> Result<File> {
        let dir = paths::requests_dir(&self.root);
        crate::io::ensure_dir(&dir)?;
        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(dir.join(paths::STORE_LOCK_FILE))?;
        FileExt::lock_exclusive(&lock_file)?;
        Ok(lock_file)
    }

    fn write(&self, request: &TestRequest) -> Result<()> {
        let data = serde_yaml::to_string(request)?;
        crate::io::atomic_write(&paths::request_path(&self.root, request.id), data.as_bytes())
    }

    /// Write a record that must not exist yet.
    fn write_new(&self, request: &TestRequest) -> Result<()> {
        let path = paths::request_path(&self.root, request.id);
        let data = serde_yaml::to_string(request)?;
        let mut tmp = NamedTempFile::new_in(paths::requests_dir(&self.root))?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist_noclobber(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<u64>> {
        let dir = paths::requests_dir(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = paths::request_id_from_file(&entry.file_name().to_string_lossy()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl TestRequestStore for FileStore {
    fn get(&self, id: u64) -> Result<TestRequest> {
        let path = paths::request_path(&self.root, id);
        if !path.exists() {
            return Err(UpstacError::NotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let request: TestRequest = serde_yaml::from_str(&data)?;
        Ok(request)
    }

    fn insert_unique(
        &self,
        mut request: TestRequest,
        admit: &dyn Fn(&[TestRequest]) -> Result<()>,
    ) -> Result<TestRequest> {
        let _lock = self.lock()?;
        admit(&self.list()?)?;
        request.id = self.ids()?.into_iter().max().unwrap_or(0) + 1;
        request.version = 1;
        self.write_new(&request)?;
        tracing::debug!(id = request.id, "stored new test request");
        Ok(request)
    }

    fn save(&self, request: &TestRequest) -> Result<TestRequest> {
        let _lock = self.lock()?;
        let current = self.get(request.id)?;
        check_version(&current, request)?;
        let mut stored = request.clone();
        stored.version += 1;
        self.write(&stored)?;
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<TestRequest>> {
        let mut requests = Vec::new();
        for id in self.ids()? {
            match self.get(id) {
                Ok(r) => requests.push(r),
                // Removed between read_dir and read.
                Err(UpstacError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        sort_requests(&mut requests);
        Ok(requests)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local store with the same versioning rules as [`FileStore`].
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<u64, TestRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<u64, TestRequest>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TestRequestStore for MemoryStore {
    fn get(&self, id: u64) -> Result<TestRequest> {
        self.records()
            .get(&id)
            .cloned()
            .ok_or(UpstacError::NotFound(id))
    }

    fn insert_unique(
        &self,
        mut request: TestRequest,
        admit: &dyn Fn(&[TestRequest]) -> Result<()>,
    ) -> Result<TestRequest> {
        let mut records = self.records();
        let mut existing: Vec<TestRequest> = records.values().cloned().collect();
        sort_requests(&mut existing);
        admit(&existing)?;
        request.id = records.keys().next_back().copied().unwrap_or(0) + 1;
        request.version = 1;
        records.insert(request.id, request.clone());
        Ok(request)
    }

    fn save(&self, request: &TestRequest) -> Result<TestRequest> {
        let mut records = self.records();
        let current = records
            .get(&request.id)
            .ok_or(UpstacError::NotFound(request.id))?;
        check_version(current, request)?;
        let mut stored = request.clone();
        stored.version += 1;
        records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<TestRequest>> {
        let mut requests: Vec<TestRequest> = self.records().values().cloned().collect();
        sort_requests(&mut requests);
        Ok(requests)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
