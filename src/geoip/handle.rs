//! Dataset handles backed by MaxMind GeoLite2 databases.
//!
//! `DatasetOpener` and `DatasetHandle` are the capability the reference store
//! is written against; `MmdbOpener` is the production implementation.

use std::net::IpAddr;
use std::path::Path;
use std::time::SystemTime;

use maxminddb::{geoip2, Reader};

use crate::error_handling::StoreError;
use crate::geoip::types::{DatasetKind, LocationRecord, OrgRecord, ReferenceRecord};

/// An opened, read-only reference database.
///
/// Handles are owned by the `ReferenceStore` and only ever borrowed by
/// lookups while the store's read lock is held.
pub trait DatasetHandle: Send + Sync {
    /// Looks up one address. `Ok(None)` means the dataset has no record for it.
    fn lookup(&self, ip: IpAddr) -> Result<Option<ReferenceRecord>, StoreError>;

    /// Releases the handle's resources. Called by the store once the handle
    /// can no longer be reached by any lookup.
    fn close(self: Box<Self>) {}
}

/// Opens dataset files into handles.
pub trait DatasetOpener: Send + Sync {
    fn open(&self, kind: DatasetKind, path: &Path) -> Result<Box<dyn DatasetHandle>, StoreError>;
}

/// Metadata about a loaded database
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Path the database was read from
    pub source: String,
    /// Database type reported by the file (e.g. "GeoLite2-City")
    pub database_type: String,
    /// Build identifier (`build_<epoch>`)
    pub version: String,
    /// When the file was loaded into memory
    pub loaded_at: SystemTime,
}

/// Opens `.mmdb` files with the `maxminddb` reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmdbOpener;

impl DatasetOpener for MmdbOpener {
    fn open(&self, kind: DatasetKind, path: &Path) -> Result<Box<dyn DatasetHandle>, StoreError> {
        Ok(Box::new(MmdbHandle::open(kind, path)?))
    }
}

/// A GeoLite2 database held fully in memory.
///
/// The file is read into an owned buffer, so no file descriptor stays open
/// and the file can be renamed over while the handle is live.
pub struct MmdbHandle {
    kind: DatasetKind,
    reader: Reader<Vec<u8>>,
    metadata: DatasetMetadata,
}

impl MmdbHandle {
    /// Loads a GeoIP database from a local file path
    pub fn open(kind: DatasetKind, path: &Path) -> Result<Self, StoreError> {
        let open_error = |reason: String| StoreError::Open {
            kind,
            path: path.to_path_buf(),
            reason,
        };

        let db_bytes = std::fs::read(path).map_err(|e| open_error(e.to_string()))?;
        let reader = Reader::from_source(db_bytes).map_err(|e| open_error(e.to_string()))?;
        let metadata = extract_metadata(&reader, path);

        log::info!(
            "Loaded {} database {:?} ({}, {})",
            kind,
            path,
            metadata.database_type,
            metadata.version
        );

        Ok(Self {
            kind,
            reader,
            metadata,
        })
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    fn decode_error(&self, reason: impl ToString) -> StoreError {
        StoreError::Decode {
            kind: self.kind,
            reason: reason.to_string(),
        }
    }
}

impl DatasetHandle for MmdbHandle {
    fn lookup(&self, ip: IpAddr) -> Result<Option<ReferenceRecord>, StoreError> {
        // maxminddb 0.27 API: lookup() returns Result<LookupResult, MaxMindDbError>
        // Use has_data() to check if data exists, then decode() to get the record
        let lookup = self
            .reader
            .lookup(ip)
            .map_err(|e| self.decode_error(e))?;

        if !lookup.has_data() {
            return Ok(None);
        }

        match self.kind {
            DatasetKind::Asn => {
                let asn: Option<geoip2::Asn> = lookup.decode().map_err(|e| self.decode_error(e))?;
                Ok(asn.and_then(|asn| {
                    asn.autonomous_system_number.map(|as_number| {
                        ReferenceRecord::Org(OrgRecord {
                            as_number,
                            org_name: asn
                                .autonomous_system_organization
                                .unwrap_or_default()
                                .to_string(),
                        })
                    })
                }))
            }
            DatasetKind::City => {
                let city: Option<geoip2::City> =
                    lookup.decode().map_err(|e| self.decode_error(e))?;
                Ok(city.map(|city| {
                    ReferenceRecord::Location(LocationRecord {
                        city: city.city.names.english.map(|s| s.to_string()),
                        region: city
                            .subdivisions
                            .first()
                            .and_then(|subdivision| subdivision.names.english)
                            .map(|s| s.to_string()),
                        country_code: city.country.iso_code.map(|s| s.to_string()),
                        latitude: city.location.latitude,
                        longitude: city.location.longitude,
                        postal_code: city.postal.code.map(|s| s.to_string()),
                        timezone: city.location.time_zone.map(|s| s.to_string()),
                    })
                }))
            }
            DatasetKind::Country => {
                let country: Option<geoip2::Country> =
                    lookup.decode().map_err(|e| self.decode_error(e))?;
                Ok(country.map(|country| {
                    ReferenceRecord::Location(LocationRecord {
                        country_code: country.country.iso_code.map(|s| s.to_string()),
                        ..Default::default()
                    })
                }))
            }
        }
    }

    fn close(self: Box<Self>) {
        log::debug!(
            "Closed {} database {} ({})",
            self.kind,
            self.metadata.source,
            self.metadata.version
        );
    }
}

/// Extracts metadata from a GeoIP database
fn extract_metadata<T: AsRef<[u8]>>(reader: &Reader<T>, path: &Path) -> DatasetMetadata {
    // MaxMind databases have a build_epoch field in their metadata
    DatasetMetadata {
        source: path.display().to_string(),
        database_type: reader.metadata.database_type.clone(),
        version: format!("build_{}", reader.metadata.build_epoch),
        loaded_at: SystemTime::now(),
    }
}
