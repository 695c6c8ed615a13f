//! Tunable parameters for the simulation

use std::collections::BTreeSet;

use super::types::NodeId;

/// Timing used when playing a vehicle back along a planned route
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyConfig {
    pub red_light_pause: f64,
    pub traffic_jam_pause: f64,
    pub passenger_pause: f64,
    pub bus_stop_pause: f64,
    /// Speed multiplier on congested edges
    pub congestion_speed_factor: f64,
    /// Nodes where buses stop to load and unload
    pub bus_stops: BTreeSet<NodeId>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            red_light_pause: 3.0,
            traffic_jam_pause: 3.0,
            passenger_pause: 2.0,
            bus_stop_pause: 2.0,
            congestion_speed_factor: 0.5,
            bus_stops: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// A stop holding more vehicles than this is gridlocked
    pub gridlock_threshold: usize,
    /// Time to wait before retrying after gridlock
    pub gridlock_wait: f64,
    /// Multiplier applied to priority edges by the priority planner
    pub reduction_factor: f64,
    pub journey: JourneyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gridlock_threshold: 3,
            gridlock_wait: 3.0,
            reduction_factor: 0.5,
            journey: JourneyConfig::default(),
        }
    }
}
