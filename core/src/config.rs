//! Bridge configuration.

/// Upper bound (exclusive) for the randomly chosen first callback counter.
pub const SEED_RANGE: u64 = 2_000_000_000;

/// Settings for a `Bridge`.
///
/// The default picks a random starting counter so identifiers from an earlier
/// page load are unlikely to collide with new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    pub initial_counter: Option<u64>,
}

impl BridgeConfig {
    /// Start the counter at a fixed value instead of a random one.
    pub fn with_initial_counter(mut self, counter: u64) -> Self {
        self.initial_counter = Some(counter);
        self
    }
}
