//! Search configuration parameters.
//!
//! `SearchConfig` holds agent-level settings that survive across calls;
//! `SearchLimits` carries the per-call resource limits a caller hands to
//! `select_action`.

/// Agent-level search configuration.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Constant inside the UCB1 square root.
    /// The exploration term is `sqrt(exploration * ln(N_parent) / N_child)`.
    pub exploration: f64,

    /// Iteration budget used to derive the halving schedule when the call
    /// carries no iteration limit.
    pub fallback_budget: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: 2.0,
            fallback_budget: 10_000,
        }
    }
}

impl SearchConfig {
    /// Create a config with the given fallback schedule budget.
    pub fn with_fallback_budget(fallback_budget: usize) -> Self {
        Self {
            fallback_budget,
            ..Default::default()
        }
    }

    /// Iteration budget the halving schedule is derived from.
    pub fn schedule_budget(&self, limits: &SearchLimits) -> usize {
        limits.iteration_cap().unwrap_or(self.fallback_budget)
    }
}

/// Resource limits for a single search call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchLimits {
    /// Wall-clock limit in seconds; `<= 0` means no time limit.
    pub max_seconds: f64,

    /// Iteration limit; negative means no iteration limit.
    pub max_iterations: i64,

    /// Accepted for interface parity; the search does not use it.
    pub max_depth: i64,
}

impl SearchLimits {
    /// No time or iteration limit.
    pub fn unlimited() -> Self {
        Self {
            max_seconds: 0.0,
            max_iterations: -1,
            max_depth: -1,
        }
    }

    /// Limit the number of search iterations.
    pub fn iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: i64::try_from(max_iterations).unwrap_or(i64::MAX),
            ..Self::unlimited()
        }
    }

    /// Limit wall-clock time.
    pub fn seconds(max_seconds: f64) -> Self {
        Self {
            max_seconds,
            ..Self::unlimited()
        }
    }

    /// The iteration cap, if any.
    pub fn iteration_cap(&self) -> Option<usize> {
        usize::try_from(self.max_iterations).ok()
    }

    /// The time limit in seconds, if any.
    pub fn time_limit(&self) -> Option<f64> {
        (self.max_seconds > 0.0).then_some(self.max_seconds)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration - 2.0).abs() < 1e-12);
        assert_eq!(config.fallback_budget, 10_000);
    }

    #[test]
    fn test_with_fallback_budget() {
        let config = SearchConfig::with_fallback_budget(500);
        assert_eq!(config.fallback_budget, 500);
        assert!((config.exploration - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unlimited() {
        let limits = SearchLimits::unlimited();
        assert_eq!(limits.iteration_cap(), None);
        assert_eq!(limits.time_limit(), None);
    }

    #[test]
    fn test_negative_iterations_mean_unlimited() {
        let limits = SearchLimits {
            max_seconds: -3.0,
            max_iterations: -7,
            max_depth: 4,
        };
        assert_eq!(limits.iteration_cap(), None);
        assert_eq!(limits.time_limit(), None);
    }

    #[test]
    fn test_zero_iterations_is_a_limit() {
        assert_eq!(SearchLimits::iterations(0).iteration_cap(), Some(0));
    }

    #[test]
    fn test_schedule_budget() {
        let config = SearchConfig::with_fallback_budget(321);
        assert_eq!(config.schedule_budget(&SearchLimits::unlimited()), 321);
        assert_eq!(config.schedule_budget(&SearchLimits::iterations(50)), 50);
        assert_eq!(config.schedule_budget(&SearchLimits::seconds(1.0)), 321);
    }
}
