use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Host alternatives: DNS name, localhost, dotted IPv4, (bracketed) IPv6.
    // Octet ranges are intentionally not range-checked.
    static ref HTTPS_URL: Regex = Regex::new(concat!(
        r"(?i)^(https://)",
        r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|",
        r"localhost|",
        r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}|",
        r"\[?[A-F0-9]*:[A-F0-9:]+\]?)",
        r"(?::\d+)?",
        r"(?:/?|[/?]\S+)$",
    ))
    .expect("Invalid HTTPS_URL regex pattern");
}

/// Returns `true` when `url` is an `https://` URL with a well-formed host.
///
/// Surrounding whitespace is ignored.
pub fn is_valid_https_url(url: &str) -> bool {
    HTTPS_URL.is_match(url.trim())
}
