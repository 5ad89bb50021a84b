//! Address lookups: the entry point request handlers call.
//!
//! An address string is parsed, classified, and (when routable) enriched from
//! the reference store and reverse DNS. Only an unparseable address is an
//! error; everything else degrades to empty fields.

mod org_names;
mod types;

use std::net::IpAddr;
use std::sync::Arc;

use crate::bogon::is_bogon;
use crate::dns::BoundedResolver;
use crate::error_handling::InputError;
use crate::geoip::{DatasetKind, LocationRecord, LookupOutcome, OrgRecord, ReferenceStore};

pub use org_names::org_name_override;
pub use types::IpDetails;

/// Produces `IpDetails` for address strings.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<ReferenceStore>,
    resolver: BoundedResolver,
}

impl LookupService {
    pub fn new(store: Arc<ReferenceStore>, resolver: BoundedResolver) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &Arc<ReferenceStore> {
        &self.store
    }

    /// Parses `input` and describes the address.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidAddress` if `input` is not an IP address.
    pub async fn produce_result(&self, input: &str) -> Result<IpDetails, InputError> {
        let ip: IpAddr = input
            .trim()
            .parse()
            .map_err(|_| InputError::InvalidAddress(input.to_string()))?;
        Ok(self.describe(ip).await)
    }

    /// Describes an already parsed address.
    ///
    /// Bogons are returned without touching the datasets or DNS. For routable
    /// addresses the dataset lookups run while the reverse lookup is in flight.
    /// An IPv4-mapped IPv6 address is described as the IPv4 address it carries.
    pub async fn describe(&self, ip: IpAddr) -> IpDetails {
        let ip = ip.to_canonical();
        let bogon = is_bogon(ip);
        let mut details = IpDetails {
            ip: ip.to_string(),
            bogon,
            ..Default::default()
        };
        if bogon {
            return details;
        }

        let (hostname, ()) = tokio::join!(self.resolver.resolve(ip), async {
            self.apply_records(ip, &mut details)
        });
        details.hostname = hostname;
        details
    }

    fn apply_records(&self, ip: IpAddr, details: &mut IpDetails) {
        match self.store.lookup(DatasetKind::Asn, ip) {
            LookupOutcome::Found(record) => {
                if let Some(org) = record.into_org() {
                    details.org = format_org(&org);
                }
            }
            outcome => log::debug!("ASN lookup for {}: {:?}", ip, outcome),
        }

        match self.store.lookup(DatasetKind::City, ip) {
            LookupOutcome::Found(record) => {
                if let Some(location) = record.into_location() {
                    apply_location(details, location);
                }
            }
            outcome => log::debug!("City lookup for {}: {:?}", ip, outcome),
        }

        if details.country.is_empty() {
            if let Some(location) = self
                .store
                .lookup(DatasetKind::Country, ip)
                .found()
                .and_then(|record| record.into_location())
            {
                details.country = location.country_code.unwrap_or_default();
            }
        }
    }
}

fn format_org(org: &OrgRecord) -> String {
    let name = org_name_override(org.as_number).unwrap_or(org.org_name.as_str());
    format!("AS{} {}", org.as_number, name).trim_end().to_string()
}

fn apply_location(details: &mut IpDetails, location: LocationRecord) {
    details.city = location.city.unwrap_or_default();
    details.region = location.region.unwrap_or_default();
    details.country = location.country_code.unwrap_or_default();
    details.postal = location.postal_code.unwrap_or_default();
    details.timezone = location.timezone.unwrap_or_default();
    if let (Some(latitude), Some(longitude)) = (location.latitude, location.longitude) {
        details.loc = format!("{:.6},{:.6}", latitude, longitude);
    }
}
