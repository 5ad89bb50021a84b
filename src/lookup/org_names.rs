//! Display names for well-known autonomous systems.
//!
//! GeoLite2 reports the registered organization (e.g. "GOOGLE"); these
//! names read better in responses.

/// Returns the preferred display name for `as_number`, if there is one.
pub fn org_name_override(as_number: u32) -> Option<&'static str> {
    let name = match as_number {
        701..=703 => "Verizon Business",
        7018 => "AT&T Services",
        1239 => "Sprint",
        3356 | 3549 => "Level 3 Communications",
        6461 => "Zayo Bandwidth",
        16509 | 14618 => "Amazon Web Services",
        8075 => "Microsoft Azure",
        15169 => "Google Cloud",
        13335 => "Cloudflare",
        7922 | 33650..=33680 => "Comcast Cable",
        11427 | 20001 | 10796 | 11351 | 12271 | 20115 => "Charter Communications",
        2906 | 40027 | 55095 | 394406 => "Netflix",
        32934 => "Facebook",
        54113 => "Fastly",
        174 => "Cogent Communications",
        1299 => "Telia Company",
        2914 => "NTT Communications",
        3257 => "GTT Communications",
        3320 => "Deutsche Telekom",
        5511 => "Orange",
        6830 => "Liberty Global",
        12956 => "Telefonica",
        209 => "CenturyLink",
        4323 | 7843 => "Time Warner Cable",
        5650 => "Frontier Communications",
        6128 => "Cablevision",
        6147 => "Telefonica USA",
        6181 => "Covad Communications",
        6327 => "Shaw Communications",
        6389 => "BellSouth.net",
        6478 => "AT&T Internet Services",
        25983 => "Monkeybrains",
        46887 => "Lightower Fiber Networks",
        19994 => "Rackspace",
        26496 => "GoDaddy",
        29748 => "Serverius",
        36351 => "SoftLayer Technologies",
        63949 => "Linode",
        14061 => "DigitalOcean",
        11537 => "Internet2",
        32 => "Stanford University",
        27 => "Department of Defense",
        _ => return None,
    };
    Some(name)
}
