//! Best-effort device class guess from the hardware address prefix

/// OUI prefixes (first three octets, lower-case) with a known device class
const DEVICE_PREFIXES: &[(&str, &str)] = &[
    ("70:28:8b", "Samsung"),
    ("00:50:f1", "Modem"),
    ("ba:af:e0", "Unknown"),
    ("e6:6c:bf", "Unknown"),
];

pub const UNKNOWN_DEVICE: &str = "Unknown";

/// Returns the OUI prefix (`xx:xx:xx`) of a colon separated MAC, lower-cased.
pub fn oui_prefix(mac: &str) -> Option<String> {
    let prefix = mac.get(..8)?.to_ascii_lowercase();
    let well_formed = prefix
        .split(':')
        .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()));
    (well_formed && prefix.matches(':').count() == 2).then_some(prefix)
}

/// Guess the device class for a MAC address; unknown prefixes map to "Unknown".
pub fn guess_device(mac: &str) -> &'static str {
    oui_prefix(mac)
        .and_then(|prefix| {
            DEVICE_PREFIXES
                .iter()
                .find(|(known, _)| *known == prefix)
                .map(|(_, device)| *device)
        })
        .unwrap_or(UNKNOWN_DEVICE)
}
