//! Events emitted by the simulation
//!
//! The engine never prints. Callers decide whether to log, render or ignore
//! these.

use super::planner::PathResult;
use super::signal::Phase;
use super::types::{EdgeId, NodeId, PassengerId, SignalId, VehicleId};

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    SignalChanged {
        signal: SignalId,
        node: NodeId,
        phase: Phase,
    },
    VehicleQueuedAtSignal {
        vehicle: VehicleId,
        signal: SignalId,
    },
    VehicleReleasedFromSignal {
        vehicle: VehicleId,
        signal: SignalId,
    },
    /// Vehicle parked in the general traffic queue at a stop
    VehicleHeld {
        vehicle: VehicleId,
        node: NodeId,
    },
    /// Vehicle left the general traffic queue and moved on
    VehicleAdvanced {
        vehicle: VehicleId,
        node: NodeId,
    },
    PassengerBoarded {
        passenger: PassengerId,
        vehicle: VehicleId,
        destination: NodeId,
    },
    PassengerAlighted {
        passenger: PassengerId,
        vehicle: VehicleId,
        node: NodeId,
    },
    Gridlock {
        node: NodeId,
        vehicles: usize,
    },
    Departed {
        vehicle: VehicleId,
        edge: EdgeId,
        from: NodeId,
        to: NodeId,
        travel_time: f64,
    },
    ArrivedAtNode {
        vehicle: VehicleId,
        node: NodeId,
    },
    ReachedDestination {
        vehicle: VehicleId,
        node: NodeId,
    },
    NoOutgoingEdge {
        vehicle: VehicleId,
        node: NodeId,
    },
    RouteRecalculated {
        edge: EdgeId,
        new_distance: f64,
        path: Option<PathResult<i64>>,
    },
}
