//! Namespace facility the endpoints are registered with.
//!
//! [`ProcNamespace`] is the glue a host provides to create the directory
//! and the entries under it and to remove them again. [`ProcTree`] is an
//! in-process implementation used by the CLI and the tests; it can be told
//! to fail a given step so startup unwinding can be exercised.

use parking_lot::Mutex;
use procintf_common::error::{IntfError, IntfResult};
use procintf_common::mode::Mode;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Registration and teardown of namespace entries.
pub trait ProcNamespace: Send + Sync {
    /// False when the host has no pseudo-filesystem support at all.
    fn available(&self) -> bool {
        true
    }

    /// Create a top-level directory.
    fn mkdir(&self, dir: &str) -> IntfResult<()>;

    /// Create an entry under `dir`.
    fn create(&self, dir: &str, name: &str, mode: Mode) -> IntfResult<()>;

    /// Remove `dir` and everything below it. Missing directories are ignored.
    fn remove_subtree(&self, dir: &str);
}

#[derive(Debug, Default)]
struct TreeInner {
    dirs: BTreeMap<String, BTreeMap<String, Mode>>,
    fail_on: Option<String>,
    unavailable: bool,
}

/// In-memory namespace; clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct ProcTree {
    inner: Arc<Mutex<TreeInner>>,
}

impl ProcTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `mkdir` or `create` of `name` fail.
    pub fn fail_on(&self, name: &str) {
        self.inner.lock().fail_on = Some(name.to_string());
    }

    /// Pretend the facility is missing.
    pub fn set_unavailable(&self) {
        self.inner.lock().unavailable = true;
    }

    /// Entries of `dir` in name order, `None` if it does not exist.
    pub fn entries(&self, dir: &str) -> Option<Vec<(String, Mode)>> {
        self.inner
            .lock()
            .dirs
            .get(dir)
            .map(|d| d.iter().map(|(n, m)| (n.clone(), *m)).collect())
    }

    /// True if no directory exists.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().dirs.is_empty()
    }
}

impl ProcNamespace for ProcTree {
    fn available(&self) -> bool {
        !self.inner.lock().unavailable
    }

    fn mkdir(&self, dir: &str) -> IntfResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_on.as_deref() == Some(dir) || inner.dirs.contains_key(dir) {
            return Err(IntfError::RegistrationFailure {
                entry: dir.to_string(),
            });
        }
        inner.dirs.insert(dir.to_string(), BTreeMap::new());
        debug!("proc dir ({}) created", dir);
        Ok(())
    }

    fn create(&self, dir: &str, name: &str, mode: Mode) -> IntfResult<()> {
        let mut inner = self.inner.lock();
        let failing = inner.fail_on.as_deref() == Some(name);
        let failure = || IntfError::RegistrationFailure {
            entry: format!("{dir}/{name}"),
        };
        let entries = inner.dirs.get_mut(dir).ok_or_else(failure)?;
        if failing || entries.contains_key(name) {
            return Err(failure());
        }
        entries.insert(name.to_string(), mode);
        debug!("proc file ({}/{}) created", dir, name);
        Ok(())
    }

    fn remove_subtree(&self, dir: &str) {
        self.inner.lock().dirs.remove(dir);
    }
}
