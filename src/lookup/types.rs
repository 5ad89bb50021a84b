//! Response record for one address.

use serde::Serialize;

/// What is known about one IP address.
///
/// Empty fields are left out of the JSON body, and `bogon` only appears when
/// it is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpDetails {
    pub ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    /// `"latitude,longitude"` with six decimals
    #[serde(skip_serializing_if = "String::is_empty")]
    pub loc: String,
    /// `"AS<number> <organization>"`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub org: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub postal: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bogon: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}
