//! Routing configuration.

/// Configuration parameters for transfer routing.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Minimum minutes between first-leg arrival and second-leg departure.
    /// Tighter changes are rejected as infeasible.
    pub min_transfer_mins: i64,

    /// Maximum minutes allowed at the hub.
    /// Longer waits are rejected as pointless.
    pub max_transfer_mins: i64,

    /// Maximum number of itineraries to return.
    pub max_results: usize,

    /// How many hubs from the nationwide fallback list to try when
    /// neither an explicit hub nor a curated entry applies.
    pub max_fallback_hubs: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_transfer_mins: 30,
            max_transfer_mins: 180, // 3 hours
            max_results: 10,
            max_fallback_hubs: 5,
        }
    }
}
