/// Canonical form used for every wallet/participant comparison.
pub fn normalize_address(addr: &str) -> String {
    addr.trim().to_ascii_lowercase()
}

pub fn addresses_match(a: &str, b: &str) -> bool {
    normalize_address(a) == normalize_address(b)
}
