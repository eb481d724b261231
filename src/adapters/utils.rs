//! Shared validation helpers for configuration and adapters.

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
///
/// Used to validate the SoftAP SSID.
pub(crate) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Dotted-quad rendering for log lines and URLs.
pub(crate) fn ipv4(addr: [u8; 4]) -> std::net::Ipv4Addr {
    std::net::Ipv4Addr::from(addr)
}
