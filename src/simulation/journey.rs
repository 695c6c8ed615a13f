//! Playback of a vehicle along a planned route
//!
//! Travel time on a segment follows the straight-line distance between its
//! end nodes. Reaching a node may start a pause (red light, jam, passenger
//! stop, bus stop) that must run out before the next segment starts.

use super::config::JourneyConfig;
use super::error::Result;
use super::network::{Edge, Network};
use super::planner::{self, PathResult};
use super::types::{NodeId, Position, VehicleKind};

/// Why a journey is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    RedLight,
    TrafficJam,
    Passengers,
    BusStop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JourneyUpdate {
    Paused {
        reason: PauseReason,
        remaining: f64,
    },
    Moving {
        from: NodeId,
        to: NodeId,
        progress: f64,
        position: Position,
    },
    ReachedNode {
        node: NodeId,
        pause: Option<PauseReason>,
    },
    Finished {
        total_time: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Journey {
    route: PathResult<i64>,
    kind: VehicleKind,
    speed: f64,
    config: JourneyConfig,
    segment: usize,
    progress: f64,
    pause: Option<(PauseReason, f64)>,
    total_time: f64,
}

impl Journey {
    /// Plan the shortest route and prepare to play it back.
    ///
    /// Returns `None` when the target cannot be reached.
    pub fn plan(
        network: &Network,
        source: NodeId,
        target: NodeId,
        kind: VehicleKind,
        config: JourneyConfig,
    ) -> Result<Option<Self>> {
        let Some(route) = planner::dijkstra(network, source, target)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            route,
            kind,
            speed: kind.base_speed(),
            config,
            segment: 0,
            progress: 0.0,
            pause: None,
            total_time: 0.0,
        }))
    }

    pub fn route(&self) -> &PathResult<i64> {
        &self.route
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// Elapsed time including pauses
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn is_finished(&self) -> bool {
        self.segment + 1 >= self.route.nodes.len()
    }

    /// Estimated time to cover the route without pauses or slowdowns
    pub fn base_duration(&self, network: &Network) -> f64 {
        self.route
            .nodes
            .windows(2)
            .map(|pair| segment_length(network, pair[0], pair[1]) / self.speed)
            .sum()
    }

    pub fn advance(&mut self, network: &Network, delta: f64) -> JourneyUpdate {
        if self.is_finished() && self.pause.is_none() {
            return JourneyUpdate::Finished {
                total_time: self.total_time,
            };
        }
        self.total_time += delta;

        if let Some((reason, remaining)) = self.pause {
            let remaining = remaining - delta;
            if remaining > 0.0 {
                self.pause = Some((reason, remaining));
                return JourneyUpdate::Paused { reason, remaining };
            }
            self.pause = None;
            return JourneyUpdate::Paused {
                reason,
                remaining: 0.0,
            };
        }

        let from = self.route.nodes[self.segment];
        let to = self.route.nodes[self.segment + 1];
        let edge = network.find_edge_between(from, to).map(|(_, edge)| edge);

        let mut speed = self.speed;
        if edge.is_some_and(|e| e.conditions.congested) {
            speed *= self.config.congestion_speed_factor;
        }
        let travel_time = segment_length(network, from, to) / speed;
        self.progress += if travel_time > 0.0 {
            delta / travel_time
        } else {
            1.0
        };

        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.segment += 1;
            let pause = self.pause_on_arrival(edge, to);
            self.pause = pause;
            return JourneyUpdate::ReachedNode {
                node: to,
                pause: pause.map(|(reason, _)| reason),
            };
        }

        let position = match (network.node(from), network.node(to)) {
            (Some(a), Some(b)) => a.position.lerp(&b.position, self.progress),
            _ => Position::default(),
        };
        JourneyUpdate::Moving {
            from,
            to,
            progress: self.progress,
            position,
        }
    }

    fn pause_on_arrival(&self, edge: Option<&Edge>, node: NodeId) -> Option<(PauseReason, f64)> {
        let config = &self.config;
        if let Some(edge) = edge {
            let conditions = edge.conditions;
            if conditions.traffic_light_present {
                return Some((PauseReason::RedLight, config.red_light_pause));
            }
            if conditions.congested {
                return Some((PauseReason::TrafficJam, config.traffic_jam_pause));
            }
            if conditions.passenger_stop {
                return Some((PauseReason::Passengers, config.passenger_pause));
            }
            if self.kind == VehicleKind::Bus && config.bus_stops.contains(&node) {
                return Some((PauseReason::BusStop, config.bus_stop_pause));
            }
        }
        None
    }
}

fn segment_length(network: &Network, from: NodeId, to: NodeId) -> f64 {
    match (network.node(from), network.node(to)) {
        (Some(a), Some(b)) => a.position.distance(&b.position),
        _ => 0.0,
    }
}
