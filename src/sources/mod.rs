pub mod client;
pub mod cme;
pub mod cnbc;
pub mod errors;
pub mod marketwatch;
pub mod poller;
pub mod wsj;

/// Parse a vendor decimal field that may carry display noise: a percent
/// suffix, comma grouping, or a not-available sentinel ("-", "UNCH", "N/A",
/// empty). Sentinels and unparseable text map to `None`; they must never
/// reach a change computation as a number.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('%');
    if trimmed.is_empty() || matches!(trimmed, "-" | "--" | "UNCH" | "N/A") {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Parse a comma-grouped volume field, with the same sentinel policy.
pub(crate) fn parse_volume(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || matches!(trimmed, "-" | "--" | "N/A") {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Translate a Dow Jones bond ticker ("TMUBMUSD10Y") into the dashboard's
/// benchmark naming ("US 10Y"). Used by the WSJ and MarketWatch feeds,
/// which share the ticker scheme.
pub(crate) fn tenor_standard_name(ticker: &str) -> Option<String> {
    let tenor = ticker.strip_prefix("TMUBMUSD")?;
    let tenor = tenor.trim_start_matches('0');
    if tenor.is_empty() {
        return None;
    }
    Some(format!("US {tenor}"))
}
