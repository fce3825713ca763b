/// Classification of a failed source attempt.
///
/// Every class falls through to the next source in the chain. The class only
/// decides whether the failing source is put on cooldown.
///
/// # Behavior Summary
///
/// | Class | Falls through? | Arms cooldown? |
/// |-------|----------------|----------------|
/// | `RateLimited` | Yes | Yes |
/// | `Forbidden` | Yes | Only when the slot's policy opts in |
/// | `Transient` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The provider answered HTTP 429.
    RateLimited,

    /// The provider answered HTTP 403. Free tiers use this for quota
    /// exhaustion and for endpoints outside the plan (Finnhub candles).
    Forbidden,

    /// Timeout, malformed payload, unknown symbol, network failure.
    Transient,
}
