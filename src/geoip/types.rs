//! GeoIP data structures.
//!
//! This module defines dataset kinds, their remote sources, and the records
//! returned by lookups.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::STAGING_SUFFIX;

/// Category of reference data held by one database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    /// Autonomous system number and organization (GeoLite2-ASN)
    Asn,
    /// City-level location (GeoLite2-City)
    City,
    /// Country-level location (GeoLite2-Country)
    Country,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::Asn => "ASN",
            DatasetKind::City => "City",
            DatasetKind::Country => "Country",
        };
        f.write_str(name)
    }
}

/// Organization owning the autonomous system an address is announced from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRecord {
    pub as_number: u32,
    pub org_name: String,
}

/// Location data for an address. Country datasets only fill `country_code`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRecord {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub postal_code: Option<String>,
    pub timezone: Option<String>,
}

/// Result of a single dataset lookup, shaped by the dataset kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceRecord {
    Org(OrgRecord),
    Location(LocationRecord),
}

impl ReferenceRecord {
    /// Returns the organization record, if this is one.
    pub fn into_org(self) -> Option<OrgRecord> {
        match self {
            ReferenceRecord::Org(org) => Some(org),
            ReferenceRecord::Location(_) => None,
        }
    }

    /// Returns the location record, if this is one.
    pub fn into_location(self) -> Option<LocationRecord> {
        match self {
            ReferenceRecord::Location(location) => Some(location),
            ReferenceRecord::Org(_) => None,
        }
    }
}

/// Outcome of `ReferenceStore::lookup`.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The dataset holds a record for the address
    Found(ReferenceRecord),
    /// The dataset was queried but holds no record for the address
    NotFound,
    /// No database is currently loaded for the requested kind
    Unavailable,
}

impl LookupOutcome {
    /// Converts to `Some(record)` for `Found`, `None` otherwise.
    pub fn found(self) -> Option<ReferenceRecord> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            LookupOutcome::NotFound | LookupOutcome::Unavailable => None,
        }
    }
}

/// Canonical GeoLite2 files and the URLs they are refreshed from.
pub const DATASET_SOURCES: &[(DatasetKind, &str, &str)] = &[
    (
        DatasetKind::Asn,
        "GeoLite2-ASN.mmdb",
        "https://git.io/GeoLite2-ASN.mmdb",
    ),
    (
        DatasetKind::City,
        "GeoLite2-City.mmdb",
        "https://git.io/GeoLite2-City.mmdb",
    ),
    (
        DatasetKind::Country,
        "GeoLite2-Country.mmdb",
        "https://git.io/GeoLite2-Country.mmdb",
    ),
];

/// One dataset file and the remote URL it is refreshed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub kind: DatasetKind,
    pub file_name: String,
    pub url: String,
}

impl DatasetSource {
    pub fn new(kind: DatasetKind, file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            url: url.into(),
        }
    }

    /// The built-in source list (ASN, City, Country).
    pub fn defaults() -> Vec<DatasetSource> {
        DATASET_SOURCES
            .iter()
            .map(|(kind, file_name, url)| DatasetSource::new(*kind, *file_name, *url))
            .collect()
    }

    /// Location of the live database file.
    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file_name)
    }

    /// Location downloads are staged at, next to the live file so the final
    /// rename stays on one filesystem.
    pub fn staging_path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.{}", self.file_name, STAGING_SUFFIX))
    }
}
