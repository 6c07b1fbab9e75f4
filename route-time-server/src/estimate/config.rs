//! Tuning parameters for the estimation engine.

/// Configuration parameters for hourly estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateConfig {
    /// Multiplier applied to every historical segment sample.
    pub traffic_factor: f64,

    /// Minutes after the last published departure window during which
    /// trips are still considered in service.
    pub service_buffer_mins: u32,

    /// Fraction of segments that must have a sample before an hour's
    /// estimate is extrapolated rather than reported absent.
    pub min_coverage: f64,
}

impl EstimateConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(traffic_factor: f64, service_buffer_mins: u32, min_coverage: f64) -> Self {
        Self {
            traffic_factor,
            service_buffer_mins,
            min_coverage,
        }
    }

    pub fn with_traffic_factor(mut self, factor: f64) -> Self {
        self.traffic_factor = factor;
        self
    }

    pub fn with_service_buffer_mins(mut self, mins: u32) -> Self {
        self.service_buffer_mins = mins;
        self
    }

    pub fn with_min_coverage(mut self, coverage: f64) -> Self {
        self.min_coverage = coverage;
        self
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            traffic_factor: 1.1,
            service_buffer_mins: 120, // 2 hours
            min_coverage: 0.5,
        }
    }
}
