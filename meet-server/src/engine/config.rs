//! Tolerances and thresholds for meeting point resolution.

/// Configuration parameters for the resolution strategies.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// A candidate whose time gap is at most this many seconds is fair.
    pub fair_gap_secs: u32,

    /// A candidate whose gap is below this share of the longer time is fair.
    pub relative_tolerance: f64,

    /// Interpolation weights tried first during refinement, in order.
    /// Weight 0 is party A's position, weight 1 is party B's.
    pub refine_weights: Vec<f64>,

    /// When shorter time / longer time falls below this, one party
    /// dominates and refinement tries weights close to the slower party.
    pub dominance_ratio: f64,

    /// Weights tried when party A is the slower one.
    pub extend_toward_a: Vec<f64>,

    /// Weights tried when party B is the slower one.
    pub extend_toward_b: Vec<f64>,

    /// Maximum rounds of step-halving search.
    pub max_search_rounds: u32,

    /// Weight step of the first search round.
    pub initial_step: f64,

    /// Lowest weight the search may try.
    pub min_weight: f64,

    /// Highest weight the search may try.
    pub max_weight: f64,

    /// Transit midpoints snap to an extracted stop within this distance.
    pub stop_snap_meters: f64,

    /// Two stops whose gaps differ by less than this are near-ties, decided
    /// by total travel time.
    pub tie_window_secs: u32,

    /// Stop matching applies the bias correction above this gap.
    pub bias_gap_secs: u32,

    /// ...and only when more than this many stops were extracted.
    pub bias_min_stops: usize,

    /// Log a warning when the final transit route's gap differs from the
    /// estimate by more than this.
    pub estimate_drift_secs: u32,

    /// Walker/transit pairs only probe for a stop on trips longer than this.
    pub probe_min_trip_secs: u32,

    /// ...with more than this many extracted stops.
    pub probe_min_stops: usize,

    /// The probe looks for the stop nearest this share of the trip.
    pub probe_target_fraction: f64,

    /// The walker will not walk longer than this to reach a stop.
    pub probe_max_walk_secs: u32,

    /// Routes to a place differing by more than this are unbalanced.
    pub unbalanced_gap_secs: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fair_gap_secs: 180,
            relative_tolerance: 0.10,
            refine_weights: vec![0.5, 0.25, 0.75],
            dominance_ratio: 0.5,
            extend_toward_a: vec![0.1, 0.02],
            extend_toward_b: vec![0.9, 0.98],
            max_search_rounds: 4,
            initial_step: 0.125,
            min_weight: 0.02,
            max_weight: 0.98,
            stop_snap_meters: 1000.0,
            tie_window_secs: 180,
            bias_gap_secs: 600,
            bias_min_stops: 5,
            estimate_drift_secs: 300,
            probe_min_trip_secs: 2700, // 45 minutes
            probe_min_stops: 2,
            probe_target_fraction: 0.6,
            probe_max_walk_secs: 1800, // 30 minutes
            unbalanced_gap_secs: 300,
        }
    }
}

impl EngineConfig {
    /// True if a time gap is small enough to stop searching.
    pub fn gap_is_fair(&self, gap_secs: u32) -> bool {
        gap_secs <= self.fair_gap_secs
    }

    /// Clamp a search weight to the allowed range.
    pub fn clamp_weight(&self, weight: f64) -> f64 {
        weight.clamp(self.min_weight, self.max_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.fair_gap_secs, 180);
        assert_eq!(config.refine_weights, [0.5, 0.25, 0.75]);
        assert_eq!(config.max_search_rounds, 4);
        assert_eq!(config.bias_gap_secs, 600);
        assert_eq!(config.bias_min_stops, 5);
    }

    #[test]
    fn fair_gap_boundary_is_inclusive() {
        let config = EngineConfig::default();

        assert!(config.gap_is_fair(180));
        assert!(!config.gap_is_fair(181));
    }

    #[test]
    fn weights_are_clamped() {
        let config = EngineConfig::default();

        assert_eq!(config.clamp_weight(-0.3), 0.02);
        assert_eq!(config.clamp_weight(1.5), 0.98);
        assert_eq!(config.clamp_weight(0.4), 0.4);
    }
}
