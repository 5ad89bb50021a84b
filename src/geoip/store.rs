//! Hot-swappable set of opened reference databases.
//!
//! Readers hold the shared lock for one lookup only. Writers hold the
//! exclusive lock only while moving handles in and out of the map; opening and
//! closing happen outside of it. A retired handle is moved out under the
//! exclusive lock, so by the time it is closed no lookup can still borrow it.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::RwLock;

use crate::error_handling::StoreError;
use crate::geoip::handle::{DatasetHandle, DatasetOpener};
use crate::geoip::types::{DatasetKind, DatasetSource, LookupOutcome};

/// Handles keyed by the dataset kind they serve
pub type HandleSet = HashMap<DatasetKind, Box<dyn DatasetHandle>>;

/// Owner of the currently visible dataset handles.
#[derive(Default)]
pub struct ReferenceStore {
    handles: RwLock<HandleSet>,
}

/// What `ReferenceStore::reload` did for each configured dataset.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Kinds whose file opened and was swapped in
    pub loaded: Vec<DatasetKind>,
    /// Kinds with no file on disk
    pub missing: Vec<DatasetKind>,
    /// Kinds whose file failed to open; the previous handle (if any) is kept
    pub failed: Vec<(DatasetKind, StoreError)>,
}

impl ReloadReport {
    /// True when no configured file failed to open.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `ip` in the dataset for `kind`.
    ///
    /// Never fails: a missing dataset is `Unavailable`, a miss or an
    /// undecodable record is `NotFound`.
    pub fn lookup(&self, kind: DatasetKind, ip: IpAddr) -> LookupOutcome {
        let handles = match self.handles.read() {
            Ok(handles) => handles,
            Err(e) => {
                log::error!("{} lookup skipped, store lock poisoned: {}", kind, e);
                return LookupOutcome::Unavailable;
            }
        };

        let Some(handle) = handles.get(&kind) else {
            return LookupOutcome::Unavailable;
        };

        match handle.lookup(ip) {
            Ok(Some(record)) => LookupOutcome::Found(record),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => {
                log::warn!("{} lookup failed for {}: {}", kind, ip, e);
                LookupOutcome::NotFound
            }
        }
    }

    /// Atomically installs `new_handles`, one per kind.
    ///
    /// Kinds not present in `new_handles` keep their current handle. The
    /// replaced handles are closed after the exclusive lock is released.
    /// Returns how many handles were retired.
    pub fn swap(&self, new_handles: HandleSet) -> Result<usize, StoreError> {
        if new_handles.is_empty() {
            return Ok(0);
        }

        let retired: Vec<Box<dyn DatasetHandle>> = {
            let mut handles = self
                .handles
                .write()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            new_handles
                .into_iter()
                .filter_map(|(kind, handle)| handles.insert(kind, handle))
                .collect()
        };

        let count = retired.len();
        for handle in retired {
            handle.close();
        }
        Ok(count)
    }

    /// Removes and closes the handle for `kind`, if one is loaded.
    ///
    /// Lookups for `kind` report `Unavailable` until the next swap.
    pub fn release(&self, kind: DatasetKind) -> Result<bool, StoreError> {
        let removed = self
            .handles
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?
            .remove(&kind);

        match removed {
            Some(handle) => {
                handle.close();
                log::debug!("Released {} database", kind);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Kinds that currently have a handle, in a stable order.
    pub fn loaded_kinds(&self) -> Vec<DatasetKind> {
        let mut kinds: Vec<DatasetKind> = match self.handles.read() {
            Ok(handles) => handles.keys().copied().collect(),
            Err(e) => {
                log::error!("Store lock poisoned: {}", e);
                Vec::new()
            }
        };
        kinds.sort();
        kinds
    }

    /// Opens every configured dataset file present in `data_dir` and swaps in
    /// whatever opened.
    ///
    /// Files are opened before the exclusive lock is taken. A kind whose file
    /// is missing or fails to open keeps its current handle.
    pub fn reload(
        &self,
        opener: &dyn DatasetOpener,
        sources: &[DatasetSource],
        data_dir: &Path,
    ) -> Result<ReloadReport, StoreError> {
        let mut report = ReloadReport::default();
        let mut opened = HandleSet::new();

        for source in sources {
            let path = source.path_in(data_dir);
            if !path.exists() {
                report.missing.push(source.kind);
                continue;
            }
            match opener.open(source.kind, &path) {
                Ok(handle) => {
                    opened.insert(source.kind, handle);
                    report.loaded.push(source.kind);
                }
                Err(e) => report.failed.push((source.kind, e)),
            }
        }

        self.swap(opened)?;
        Ok(report)
    }
}
