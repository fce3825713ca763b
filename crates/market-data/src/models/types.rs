use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Canonical form of a ticker: trimmed and upper-cased.
///
/// Cache keys and provider requests always use this form, so `" aapl"` and
/// `"AAPL"` share one cache entry.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}
