// Shared test helpers: in-memory fake datasets and resolvers.
//
// Fake dataset files are plain text. The first line is a label starting with
// `#`; every other line is one record:
//   ASN:     `ip|as_number|organization`
//   City:    `ip|city|country`
//   Country: `ip|country`
// A file whose first line is not a label fails to open.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use ipscope::dns::{BoundedResolver, ReverseLookup};
use ipscope::geoip::{
    DatasetHandle, DatasetKind, DatasetOpener, DatasetSource, LocationRecord, OrgRecord,
    ReferenceRecord,
};
use ipscope::StoreError;

/// Handle over records parsed from a fake dataset file.
///
/// Counts every lookup that reaches it after it was closed.
pub struct FakeHandle {
    kind: DatasetKind,
    path: Option<PathBuf>,
    records: HashMap<IpAddr, ReferenceRecord>,
    closed: Arc<AtomicBool>,
    violations: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeHandle {
    /// A handle answering every address in `ips` with one AS number.
    pub fn with_org(
        as_number: u32,
        ips: &[IpAddr],
        violations: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    ) -> Self {
        let records = ips
            .iter()
            .map(|ip| {
                (
                    *ip,
                    ReferenceRecord::Org(OrgRecord {
                        as_number,
                        org_name: format!("Org {}", as_number),
                    }),
                )
            })
            .collect();
        Self {
            kind: DatasetKind::Asn,
            path: None,
            records,
            closed: Arc::new(AtomicBool::new(false)),
            violations,
            closes,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A City handle with one location record.
    pub fn with_city(ip: IpAddr, city: &str, country: &str) -> Self {
        let mut records = HashMap::new();
        records.insert(
            ip,
            ReferenceRecord::Location(LocationRecord {
                city: Some(city.to_string()),
                country_code: Some(country.to_string()),
                ..Default::default()
            }),
        );
        Self {
            kind: DatasetKind::City,
            path: None,
            records,
            closed: Arc::new(AtomicBool::new(false)),
            violations: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn boxed(self) -> Box<dyn DatasetHandle> {
        Box::new(self)
    }
}

impl DatasetHandle for FakeHandle {
    fn lookup(&self, ip: IpAddr) -> Result<Option<ReferenceRecord>, StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.records.get(&ip).cloned())
    }

    fn close(self: Box<Self>) {
        self.closed.store(true, Ordering::SeqCst);
        self.closes.fetch_add(1, Ordering::SeqCst);
        // What the live file holds at the moment this handle is released
        if let Some(path) = &self.path {
            let on_disk = std::fs::read_to_string(path)
                .ok()
                .and_then(|text| text.lines().next().map(str::to_string))
                .unwrap_or_else(|| "<missing>".to_string());
            self.events
                .lock()
                .unwrap()
                .push(format!("close {} saw {}", self.kind, on_disk));
        }
    }
}

/// Opens fake dataset files and records what it opens and what gets closed.
#[derive(Clone, Default)]
pub struct FakeOpener {
    events: Arc<Mutex<Vec<String>>>,
    violations: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl FakeOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl DatasetOpener for FakeOpener {
    fn open(&self, kind: DatasetKind, path: &Path) -> Result<Box<dyn DatasetHandle>, StoreError> {
        let open_error = |reason: String| StoreError::Open {
            kind,
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| open_error(e.to_string()))?;
        let mut lines = text.lines();
        let label = match lines.next() {
            Some(label) if label.starts_with('#') => label.to_string(),
            _ => return Err(open_error("missing label line".to_string())),
        };

        let mut records = HashMap::new();
        for line in lines.filter(|line| !line.trim().is_empty()) {
            let (ip, record) = parse_record(kind, line).ok_or_else(|| open_error(line.to_string()))?;
            records.insert(ip, record);
        }

        self.events
            .lock()
            .unwrap()
            .push(format!("open {} {}", kind, label));

        Ok(Box::new(FakeHandle {
            kind,
            path: Some(path.to_path_buf()),
            records,
            closed: Arc::new(AtomicBool::new(false)),
            violations: Arc::clone(&self.violations),
            closes: Arc::clone(&self.closes),
            events: Arc::clone(&self.events),
        }))
    }
}

fn parse_record(kind: DatasetKind, line: &str) -> Option<(IpAddr, ReferenceRecord)> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let ip: IpAddr = fields.first()?.parse().ok()?;
    let record = match kind {
        DatasetKind::Asn => ReferenceRecord::Org(OrgRecord {
            as_number: fields.get(1)?.parse().ok()?,
            org_name: fields.get(2).copied().unwrap_or_default().to_string(),
        }),
        DatasetKind::City => ReferenceRecord::Location(LocationRecord {
            city: fields.get(1).map(|s| s.to_string()),
            country_code: fields.get(2).map(|s| s.to_string()),
            ..Default::default()
        }),
        DatasetKind::Country => ReferenceRecord::Location(LocationRecord {
            country_code: Some(fields.get(1)?.to_string()),
            ..Default::default()
        }),
    };
    Some((ip, record))
}

/// Writes a fake dataset file into `dir`.
pub fn write_dataset(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, content).expect("Failed to write dataset file");
    path
}

/// Backdates a file's modification time.
pub fn set_age(path: &Path, age: Duration) {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(std::time::SystemTime::now() - age)
        .expect("Failed to set modification time");
}

/// Default file names with URLs pointing at `base_url`.
pub fn sources_at(base_url: &str) -> Vec<DatasetSource> {
    DatasetSource::defaults()
        .into_iter()
        .map(|source| {
            let url = format!("{}/{}", base_url, source.file_name);
            DatasetSource::new(source.kind, source.file_name, url)
        })
        .collect()
}

pub fn source_for(kind: DatasetKind, base_url: &str) -> DatasetSource {
    sources_at(base_url)
        .into_iter()
        .find(|source| source.kind == kind)
        .expect("Unknown dataset kind")
}

/// Reverse lookup that never finds a record.
pub struct NoRecordLookup;

impl ReverseLookup for NoRecordLookup {
    fn lookup_ptr(&self, _ip: IpAddr) -> BoxFuture<'static, anyhow::Result<Vec<String>>> {
        async { Err(anyhow::anyhow!("no PTR record")) }.boxed()
    }
}

/// Reverse lookup answering every address with one name.
pub struct StaticLookup(pub &'static str);

impl ReverseLookup for StaticLookup {
    fn lookup_ptr(&self, _ip: IpAddr) -> BoxFuture<'static, anyhow::Result<Vec<String>>> {
        let name = self.0.to_string();
        async move { Ok(vec![name]) }.boxed()
    }
}

pub fn no_dns() -> BoundedResolver {
    BoundedResolver::new(Arc::new(NoRecordLookup))
}

/// Opener whose first open blocks for `delay` after reading the file, then
/// optionally deletes `remove_after_delay`. Later opens go straight through.
///
/// Used to keep a reload in flight while a refresh runs alongside it.
pub struct SlowFirstOpener {
    inner: FakeOpener,
    delay: Duration,
    remove_after_delay: Option<PathBuf>,
    first: AtomicBool,
}

impl SlowFirstOpener {
    pub fn new(inner: FakeOpener, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            remove_after_delay: None,
            first: AtomicBool::new(true),
        }
    }

    pub fn removing(mut self, path: PathBuf) -> Self {
        self.remove_after_delay = Some(path);
        self
    }
}

impl DatasetOpener for SlowFirstOpener {
    fn open(&self, kind: DatasetKind, path: &Path) -> Result<Box<dyn DatasetHandle>, StoreError> {
        let handle = self.inner.open(kind, path)?;
        if self.first.swap(false, Ordering::SeqCst) {
            std::thread::sleep(self.delay);
            if let Some(victim) = &self.remove_after_delay {
                let _ = std::fs::remove_file(victim);
            }
        }
        Ok(handle)
    }
}
